use machina::entity::EntityId;
use machina::error::ConfigError;
use machina::machine::action::{Action, ActionCategory, ActionDescriptor, ParameterKind};
use machina::machine::definition::{self, ActionDef};
use machina::machine::registry::{self, Registration};
use machina::machine::value::Value;
use machina::machine::MachineContext;
use speculoos::prelude::*;

mod common;

use common::null_services;

const COUNTER: &str = r#"{
    "id": "counter",
    "initialState": "counting",
    "vars": { "total": 2 },
    "states": {
        "counting": {
            "actions": [
                { "kind": "addVariable", "options": { "variable": "total", "amount": 3 } }
            ],
            "transitions": {}
        }
    }
}"#;

mod build_tests {
    use super::*;

    #[test]
    fn parsed_definition_builds_a_running_machine() {
        let def = definition::parse(COUNTER).unwrap();
        let mut machine = definition::build(&def, EntityId(4), null_services()).unwrap();

        assert_that(&machine.id()).is_equal_to("counter");
        assert_that(&machine.owner()).is_equal_to(EntityId(4));
        assert_that(&machine.variable("total")).is_equal_to(Some(&Value::Number(2.0)));

        machine.start();
        assert_that(&machine.current_state()).is_equal_to(Some("counting"));
        machine.update();
        machine.update();
        assert_that(&machine.variable("total")).is_equal_to(Some(&Value::Number(8.0)));
    }

    #[test]
    fn non_storable_initial_values_are_skipped() {
        let def = definition::parse(
            r#"{
                "initialState": "s",
                "vars": { "blob": { "nested": true } },
                "states": { "s": {} }
            }"#,
        )
        .unwrap();
        let machine = definition::build(&def, EntityId(1), null_services()).unwrap();
        assert_that(&machine.variable("blob")).is_equal_to(None);
    }

    #[test]
    fn missing_required_parameter_fails_the_build() {
        let def = definition::parse(
            r#"{
                "initialState": "s",
                "states": { "s": { "actions": [ { "kind": "addVariable" } ] } }
            }"#,
        )
        .unwrap();
        let error = definition::build(&def, EntityId(1), null_services()).err().unwrap();
        assert_that(&error).is_equal_to(ConfigError::MissingParameter {
            kind: "addVariable".to_string(),
            key: "variable".to_string(),
        });
    }
}

mod validate_tests {
    use super::*;

    #[test]
    fn invalid_json_is_malformed() {
        let error = definition::parse("{ nope").unwrap_err();
        assert_that(&matches!(error, ConfigError::Malformed(_))).is_true();
    }

    #[test]
    fn unknown_initial_state_is_rejected() {
        let def = definition::parse(r#"{ "initialState": "ghost", "states": { "s": {} } }"#).unwrap();
        let error = definition::validate(&def).unwrap_err();
        assert_that(&error).is_equal_to(ConfigError::UnknownState("ghost".to_string()));
    }

    #[test]
    fn dangling_transition_targets_are_rejected() {
        let def = definition::parse(
            r#"{
                "initialState": "s",
                "states": { "s": { "transitions": { "go": "nowhere" } } }
            }"#,
        )
        .unwrap();
        let error = definition::validate(&def).unwrap_err();
        assert_that(&error).is_equal_to(ConfigError::DanglingTransition {
            state: "s".to_string(),
            key: "go".to_string(),
            target: "nowhere".to_string(),
        });
    }

    #[test]
    fn unregistered_action_kinds_are_rejected() {
        let def = definition::parse(
            r#"{
                "initialState": "s",
                "states": { "s": { "actions": [ { "kind": "teleport" } ] } }
            }"#,
        )
        .unwrap();
        let error = definition::validate(&def).unwrap_err();
        assert_that(&error).is_equal_to(ConfigError::UnknownActionKind("teleport".to_string()));
    }

    #[test]
    fn mistyped_options_are_rejected() {
        let def = definition::parse(
            r#"{
                "initialState": "s",
                "states": { "s": { "actions": [
                    { "kind": "addVariable", "options": { "variable": "x", "amount": true } }
                ] } }
            }"#,
        )
        .unwrap();
        let error = definition::validate(&def).unwrap_err();
        assert_that(&error).is_equal_to(ConfigError::ParameterType {
            key: "amount".to_string(),
            expected: ParameterKind::Float,
        });
    }

    #[test]
    fn slider_options_outside_their_range_are_rejected() {
        let def = definition::parse(
            r#"{
                "initialState": "s",
                "states": { "s": { "actions": [
                    { "kind": "addVariable", "options": { "variable": "x", "amount": 42 } }
                ] } }
            }"#,
        )
        .unwrap();
        let error = definition::validate(&def).unwrap_err();
        assert_that(&matches!(error, ConfigError::ParameterOutOfRange { .. })).is_true();
    }
}

mod registry_tests {
    use super::*;

    static NOOP_DESCRIPTOR: ActionDescriptor = ActionDescriptor {
        name: "No-op",
        category: ActionCategory::Logic,
        description: "Does nothing, exists for registration tests.",
        can_transition: false,
        parameters: &[],
        transitions: &[],
    };

    struct NoopAction;

    impl Action for NoopAction {
        fn descriptor(&self) -> &'static ActionDescriptor {
            &NOOP_DESCRIPTOR
        }

        fn run(&mut self, _ctx: &mut MachineContext<'_>) {}
    }

    fn build_noop(_def: &ActionDef) -> Result<Box<dyn Action>, ConfigError> {
        Ok(Box::new(NoopAction))
    }

    #[test]
    fn builtin_kinds_are_preregistered() {
        assert_that(&registry::is_registered("hoverEnter")).is_true();
        assert_that(&registry::is_registered("wasdInput")).is_true();
        assert_that(&registry::is_registered("addVariable")).is_true();
        assert_that(&registry::is_registered("teleport")).is_false();
    }

    #[test]
    fn descriptors_expose_authoring_metadata() {
        let descriptor = registry::descriptor("hoverEnter").unwrap();
        assert_that(&descriptor.name).is_equal_to("Hover Enter");
        assert_that(&descriptor.can_transition).is_true();
        assert_that(&descriptor.parameter("accuracy").is_some()).is_true();

        let wasd = registry::descriptor("wasdInput").unwrap();
        assert_that(&wasd.can_transition).is_false();
    }

    #[test]
    fn host_registered_kinds_build_through_definitions() {
        registry::register(
            "noop",
            Registration {
                descriptor: &NOOP_DESCRIPTOR,
                build: build_noop,
            },
        );

        let def = definition::parse(
            r#"{
                "initialState": "s",
                "states": { "s": { "actions": [ { "kind": "noop" } ] } }
            }"#,
        )
        .unwrap();
        let machine = definition::build(&def, EntityId(1), null_services()).unwrap();
        assert_that(&machine.state("s").map(|s| s.action_count())).is_equal_to(Some(1));
    }
}
