//! Tests for the `#[derive(ControlPoint)]` macro from tiller-macros.

use pretty_assertions::assert_eq;
use tiller::{status, Control, ControlFlow, ControlPoint};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, ControlPoint)]
enum Cp {
    Initialize,
    AdvanceSolution,
    #[control_point(meta)]
    CycleControl,
    Finalize,
}

#[test]
fn labels_are_snake_case_variant_names() {
    assert_eq!(Cp::Initialize.label(), "initialize");
    assert_eq!(Cp::AdvanceSolution.label(), "advance_solution");
    assert_eq!(Cp::CycleControl.label(), "cycle_control");
    assert_eq!(Cp::Finalize.label(), "finalize");
}

#[test]
fn meta_attribute_marks_meta_points() {
    assert!(Cp::CycleControl.meta());
    assert!(!Cp::Initialize.meta());
    assert!(!Cp::Finalize.meta());
}

#[test]
fn derived_points_drive_a_flow() {
    let flow = ControlFlow::new()
        .point(Cp::Initialize)
        .point(Cp::AdvanceSolution)
        .point(Cp::Finalize);
    let mut control = Control::new("derived", flow, Vec::<&'static str>::new());

    for (point, name) in [
        (Cp::Initialize, "initialize"),
        (Cp::AdvanceSolution, "advance_solution"),
        (Cp::Finalize, "finalize"),
    ] {
        control
            .action(point, name, move |ctx| {
                ctx.state_mut().push(name);
                status::SUCCESS
            })
            .unwrap();
    }

    control.execute().unwrap();
    assert_eq!(
        control.state(),
        &vec!["initialize", "advance_solution", "finalize"]
    );
}

#[test]
fn meta_points_render_dashed_in_export() {
    let flow: ControlFlow<Cp, ()> = ControlFlow::new()
        .point(Cp::Initialize)
        .point(Cp::CycleControl);
    let mut control = Control::new("meta", flow, ());

    let description = control.describe(false).unwrap();
    assert!(description.points.iter().any(|p| p.meta));

    let dot = tiller::export::graphviz::to_dot(&description);
    assert!(dot.contains("style=dashed;"));
}
