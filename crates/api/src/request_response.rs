// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! What a wizard page hands back to the HTTP layer.

use serde::Serialize;
use serde_json::Value;
use water_abstraction_forms::Form;

/// A `303 See Other` redirect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Redirect {
    /// Target URL, path and query.
    pub location: String,
}

impl Redirect {
    /// Creates a redirect to `location`.
    #[must_use]
    pub const fn see_other(location: String) -> Self {
        Self { location }
    }
}

/// The view model for a page: the form to render plus page data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewModel {
    /// Page title.
    pub page_title: String,
    /// The form, with any values and errors.
    pub form: Form,
    /// Link for the back button.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub back_link: Option<String>,
    /// Extra data the page shows.
    #[serde(skip_serializing_if = "Value::is_null")]
    pub data: Value,
}

/// The result of handling a page request.
#[derive(Debug, Clone, PartialEq)]
pub enum PageOutcome {
    /// Render the view model.
    View(Box<ViewModel>),
    /// Redirect the browser.
    Redirect(Redirect),
}

impl PageOutcome {
    /// Returns the view model, if any.
    #[must_use]
    pub fn view(&self) -> Option<&ViewModel> {
        match self {
            Self::View(view) => Some(view),
            Self::Redirect(_) => None,
        }
    }

    /// Returns the redirect location, if any.
    #[must_use]
    pub fn location(&self) -> Option<&str> {
        match self {
            Self::View(_) => None,
            Self::Redirect(redirect) => Some(&redirect.location),
        }
    }
}
