//! Convergence controller behavior: idempotence, terminal failures, and a
//! full floor model with slabs, ties and footings

use rcframe::prelude::*;

fn portal(live_udl: f64) -> FrameModel {
    let mut model = FrameModel::new();

    model.add_material("M25", Material::m25()).unwrap();
    model
        .add_section("COL", Section::rectangular(0.30, 0.30))
        .unwrap();
    model
        .add_section("BM", Section::rectangular(0.23, 0.40))
        .unwrap();

    model.add_node("N1", Node::new(0.0, 0.0, 0.0)).unwrap();
    model.add_node("N2", Node::new(0.0, 3.0, 0.0)).unwrap();
    model.add_node("N3", Node::new(4.5, 3.0, 0.0)).unwrap();
    model.add_node("N4", Node::new(4.5, 0.0, 0.0)).unwrap();

    model
        .add_element("C1", Element::column("N1", "N2", "M25", "COL"))
        .unwrap();
    model
        .add_element("B1", Element::beam("N2", "N3", "M25", "BM"))
        .unwrap();
    model
        .add_element("C2", Element::column("N4", "N3", "M25", "COL"))
        .unwrap();

    model.add_support("N1", Support::fixed()).unwrap();
    model.add_support("N4", Support::fixed()).unwrap();

    model.add_load_case(LoadCase::dead()).unwrap();
    model.add_load_case(LoadCase::live()).unwrap();
    model.apply_self_weight("Dead").unwrap();
    model
        .add_element_dist_load("B1", DistributedLoad::downward(live_udl, "Live"))
        .unwrap();

    model
}

/// Two-bay braced floor with a slab strip, base ties and footings
fn floor_model() -> FrameModel {
    let mut model = FrameModel::new();

    model.add_material("M25", Material::m25()).unwrap();
    model
        .add_section("COL", Section::rectangular(0.30, 0.30))
        .unwrap();
    model
        .add_section("BM", Section::rectangular(0.23, 0.40))
        .unwrap();
    model
        .add_section("TIE", Section::rectangular(0.23, 0.30))
        .unwrap();
    model.add_section("SLAB", Section::slab_strip(0.15)).unwrap();

    for (name, x, y) in [
        ("B1", 0.0, 0.0),
        ("B2", 4.0, 0.0),
        ("B3", 8.0, 0.0),
        ("T1", 0.0, 3.0),
        ("T2", 4.0, 3.0),
        ("T3", 8.0, 3.0),
    ] {
        model.add_node(name, Node::new(x, y, 0.0)).unwrap();
    }

    for (name, i, j) in [("C1", "B1", "T1"), ("C2", "B2", "T2"), ("C3", "B3", "T3")] {
        model
            .add_element(name, Element::column(i, j, "M25", "COL"))
            .unwrap();
    }
    model
        .add_element("BM1", Element::beam("T1", "T2", "M25", "BM"))
        .unwrap();
    model
        .add_element(
            "SL1",
            Element::new("T2", "T3", "M25", "SLAB", ElementKind::SlabStrip),
        )
        .unwrap();
    for (name, i, j) in [("TIE1", "B1", "B2"), ("TIE2", "B2", "B3")] {
        model
            .add_element(name, Element::new(i, j, "M25", "TIE", ElementKind::FootingTie))
            .unwrap();
    }

    let footing = Foundation::with_sbc(200.0);
    for base in ["B1", "B2", "B3"] {
        model
            .add_support(base, Support::fixed().on_soil(footing))
            .unwrap();
    }

    model.add_load_case(LoadCase::dead()).unwrap();
    model.add_load_case(LoadCase::live()).unwrap();
    model.apply_self_weight("Dead").unwrap();
    model
        .add_element_dist_load("BM1", DistributedLoad::downward(10e3, "Live"))
        .unwrap();
    model
        .add_element_dist_load("SL1", DistributedLoad::downward(3e3, "Live"))
        .unwrap();

    model
}

#[test]
fn rerunning_a_converged_engine_takes_one_clean_cycle() {
    let mut engine = DesignEngine::new(portal(12e3), CodeProfile::default());
    let first = engine.run().unwrap();
    assert_eq!(engine.state(), EngineState::Converged);

    // The engine keeps its sized model: feeding the final sections back in
    // must converge immediately with nothing dirty
    let second = engine.run().unwrap();
    assert_eq!(second.cycles, 1);
    assert_eq!(second.history[0].dirty, 0);
    assert_eq!(first.records.len(), second.records.len());
}

#[test]
fn hopeless_demand_is_non_convergent_not_partial() {
    let mut engine = DesignEngine::new(portal(800e3), CodeProfile::default());
    match engine.run() {
        Err(EngineError::NonConvergent { reason, .. }) => {
            assert!(reason.contains("underdesigned"), "reason: {reason}");
        }
        other => panic!("expected non-convergent, got {other:?}"),
    }
    assert_eq!(engine.state(), EngineState::Failed);
}

#[test]
fn missing_mandated_case_fails_in_the_loads_stage() {
    let profile = CodeProfile::default().with_seismic_zone(SeismicZone::IV);
    let mut engine = DesignEngine::new(portal(12e3), profile);
    match engine.run() {
        Err(err @ EngineError::IncompleteLoadData { .. }) => {
            assert_eq!(err.stage(), Stage::Loads);
        }
        other => panic!("expected incomplete load data, got {other:?}"),
    }
}

#[test]
fn floor_model_designs_every_member_kind() {
    let mut engine = DesignEngine::new(floor_model(), CodeProfile::default());
    let design = engine.run().unwrap();

    assert!(design.summary.feasible);

    // One record per element plus one footing per supported base
    assert_eq!(design.records.len(), 7 + 3);
    let kinds: Vec<DesignKind> = design.records.iter().map(|r| r.kind).collect();
    assert!(kinds.contains(&DesignKind::Column));
    assert!(kinds.contains(&DesignKind::Beam));
    assert!(kinds.contains(&DesignKind::SlabStrip));
    assert!(kinds.contains(&DesignKind::FootingTie));
    assert!(kinds.contains(&DesignKind::Footing));

    // Footings report soil-facing checks and carry mesh spacing
    let footing = design.record_for("B2").unwrap();
    assert_eq!(footing.kind, DesignKind::Footing);
    assert!(footing.width >= 0.6);
    assert!(footing.reinforcement.bar_spacing.is_some());
    assert!(footing.reserve_ratio >= 1.0);

    // The take-off feeds the fitness signal
    assert!(design.summary.concrete_volume > 0.0);
    assert!(design.summary.steel_mass > 0.0);
    assert!(design.summary.cost_index > 0.0);
    assert_eq!(design.summary.members_total, design.records.len());
}

#[test]
fn heavier_loading_never_cheapens_the_design() {
    let run = |live: f64| {
        let mut engine = DesignEngine::new(portal(live), CodeProfile::default());
        engine.run().unwrap()
    };
    let light = run(8e3);
    let heavy = run(20e3);

    let m_light = light.analysis.envelope("B1").unwrap().peak_moment_z().0;
    let m_heavy = heavy.analysis.envelope("B1").unwrap().peak_moment_z().0;
    assert!(m_heavy > m_light);
    assert!(heavy.summary.cost_index >= light.summary.cost_index);
}
