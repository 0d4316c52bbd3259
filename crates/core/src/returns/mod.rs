// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Commands that fill in a return submission, one wizard page at a time.

mod apply;
mod command;

pub use apply::apply_return_command;
pub use command::ReturnCommand;
