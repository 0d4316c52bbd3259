// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use std::collections::HashSet;
use water_abstraction_domain::{ReturnMethod, RoutingAction};

use crate::tests::helpers::create_test_return;
use crate::{
    ExternalJourney, ExternalStep, FlowAnswers, InternalJourney, InternalStep, Journey,
    JourneyKind,
};

/// Every combination of branching answers.
fn all_answers() -> Vec<FlowAnswers> {
    let mut answers: Vec<FlowAnswers> = Vec::new();
    for routing_action in [None, Some(RoutingAction::Submit), Some(RoutingAction::LogReceipt)] {
        for bits in 0..32_u8 {
            answers.push(FlowAnswers {
                routing_action,
                is_nil: bits & 1 != 0,
                one_meter: bits & 2 != 0,
                meter_reset: bits & 4 != 0,
                is_single_total: bits & 8 != 0,
                meter_details_provided: bits & 16 != 0,
            });
        }
    }
    answers
}

fn walk<J: Journey>(answers: &FlowAnswers) -> Vec<J::Step> {
    let mut path: Vec<J::Step> = vec![J::first()];
    while let Some(next) = J::next(*path.last().unwrap(), answers) {
        assert!(
            !path.contains(&next),
            "step {next:?} revisited for {answers:?}"
        );
        path.push(next);
    }
    path
}

fn assert_journey_properties<J: Journey>(terminal: J::Step) {
    for answers in all_answers() {
        let path: Vec<J::Step> = walk::<J>(&answers);
        assert_eq!(*path.last().unwrap(), terminal, "{answers:?}");
        for pair in path.windows(2) {
            assert_eq!(
                J::previous(pair[1], &answers),
                Some(pair[0]),
                "previous of {:?} for {answers:?}",
                pair[1]
            );
        }
    }
}

#[test]
fn test_internal_walks_reach_submitted() {
    assert_journey_properties::<InternalJourney>(InternalStep::Submitted);
}

#[test]
fn test_external_walks_reach_submitted() {
    assert_journey_properties::<ExternalJourney>(ExternalStep::Submitted);
}

#[test]
fn test_transitions_are_total() {
    for answers in all_answers() {
        for step in InternalJourney::all() {
            assert_eq!(
                InternalJourney::next(*step, &answers).is_none(),
                *step == InternalStep::Submitted
            );
            assert_eq!(
                InternalJourney::previous(*step, &answers).is_none(),
                *step == InternalStep::Start
            );
            if let Some(next) = InternalJourney::next(*step, &answers) {
                assert!(InternalJourney::previous(next, &answers).is_some());
            }
        }
        for step in ExternalJourney::all() {
            assert_eq!(
                ExternalJourney::next(*step, &answers).is_none(),
                *step == ExternalStep::Submitted
            );
            assert_eq!(
                ExternalJourney::previous(*step, &answers).is_none(),
                *step == ExternalStep::Start
            );
        }
    }
}

#[test]
fn test_default_answers_take_volumes_path() {
    let path: Vec<InternalStep> = walk::<InternalJourney>(&FlowAnswers::default());
    assert_eq!(
        path,
        vec![
            InternalStep::Start,
            InternalStep::InternalRouting,
            InternalStep::DateReceived,
            InternalStep::NilReturn,
            InternalStep::Method,
            InternalStep::Units,
            InternalStep::SingleTotal,
            InternalStep::Quantities,
            InternalStep::MeterDetailsProvided,
            InternalStep::Confirm,
            InternalStep::Submitted,
        ]
    );
}

#[test]
fn test_meter_readings_path() {
    let answers: FlowAnswers = FlowAnswers {
        one_meter: true,
        ..FlowAnswers::default()
    };
    let path: Vec<ExternalStep> = walk::<ExternalJourney>(&answers);
    assert_eq!(
        path,
        vec![
            ExternalStep::Start,
            ExternalStep::NilReturn,
            ExternalStep::Method,
            ExternalStep::MeterReset,
            ExternalStep::MeterUnits,
            ExternalStep::MeterReadings,
            ExternalStep::MeterDetails,
            ExternalStep::Confirm,
            ExternalStep::Submitted,
        ]
    );
}

#[test]
fn test_log_receipt_skips_to_submitted() {
    let answers: FlowAnswers = FlowAnswers {
        routing_action: Some(RoutingAction::LogReceipt),
        ..FlowAnswers::default()
    };
    assert_eq!(
        walk::<InternalJourney>(&answers),
        vec![
            InternalStep::Start,
            InternalStep::InternalRouting,
            InternalStep::LogReceipt,
            InternalStep::Submitted,
        ]
    );
}

#[test]
fn test_paths_round_trip() {
    for step in InternalJourney::all() {
        assert_eq!(
            InternalJourney::from_path(InternalJourney::path(*step)),
            Some(*step)
        );
    }
    for step in ExternalJourney::all() {
        assert_eq!(
            ExternalJourney::from_path(ExternalJourney::path(*step)),
            Some(*step)
        );
    }
    assert_eq!(InternalJourney::from_path("meter-used"), None);
    assert_eq!(ExternalJourney::from_path("single-total"), None);
}

#[test]
fn test_paths_are_unique() {
    let internal: HashSet<&str> = InternalJourney::all()
        .iter()
        .map(|s| InternalJourney::path(*s))
        .collect();
    assert_eq!(internal.len(), InternalJourney::all().len());
    let external: HashSet<&str> = ExternalJourney::all()
        .iter()
        .map(|s| ExternalJourney::path(*s))
        .collect();
    assert_eq!(external.len(), ExternalJourney::all().len());
}

#[test]
fn test_answers_from_return_model() {
    let mut model = create_test_return();
    assert_eq!(FlowAnswers::from_return(&model), FlowAnswers::default());

    model.is_nil = Some(false);
    model.reading.method = Some(ReturnMethod::OneMeter);
    model.reading.meter_reset = Some(true);
    let answers: FlowAnswers = FlowAnswers::from_return(&model);
    assert!(answers.one_meter);
    assert!(answers.meter_reset);
    assert!(!answers.uses_readings());
}

#[test]
fn test_journey_kind_parses() {
    assert_eq!("internal".parse::<JourneyKind>(), Ok(JourneyKind::Internal));
    assert_eq!("external".parse::<JourneyKind>(), Ok(JourneyKind::External));
    assert!("other".parse::<JourneyKind>().is_err());
}
