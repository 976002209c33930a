//! Unit tests for epi-intervention.

#[cfg(test)]
mod helpers {
    use epi_core::{Point, Polygon};
    use epi_spatial::{BuildingCategory, BuildingFootprint, Environment, EnvironmentConfig, Geometry, RoadLine};

    /// One street with four schools, three non-essential workplaces and a
    /// home, in that id order.
    pub fn env() -> Environment {
        let mut buildings = Vec::new();
        let cats = [
            BuildingCategory::School,
            BuildingCategory::School,
            BuildingCategory::School,
            BuildingCategory::School,
            BuildingCategory::NonEssentialWorkplace,
            BuildingCategory::NonEssentialWorkplace,
            BuildingCategory::NonEssentialWorkplace,
            BuildingCategory::Residential,
        ];
        for (i, category) in cats.into_iter().enumerate() {
            let x = i as f64 * 20.0;
            buildings.push(BuildingFootprint {
                category,
                polygon: Polygon::rect(Point::new(x, 5.0), Point::new(x + 8.0, 13.0)),
            });
        }
        let geometry = Geometry {
            buildings,
            roads: vec![RoadLine { points: vec![Point::new(0.0, 0.0), Point::new(200.0, 0.0)] }],
        };
        Environment::build(&geometry, &EnvironmentConfig::default()).unwrap()
    }
}

// ── Parameters ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod params {
    use crate::{InterventionError, InterventionKind, InterventionParam, Interventions};

    #[test]
    fn defaults_and_overrides() {
        let p = InterventionParam::new(InterventionKind::Masks, 0, 10).with("compliance", 0.25);
        assert_eq!(p.get("compliance"), 0.25);
        assert_eq!(p.get("incoming"), 0.5);
        assert_eq!(InterventionKind::Vaccination.default_param("max_doses"), Some(2.0));
        assert_eq!(InterventionKind::Masks.default_param("fraction"), None);
    }

    #[test]
    fn reversed_window_fails_initialization() {
        let err = Interventions::new(vec![InterventionParam::new(InterventionKind::Masks, 10, 5)])
            .err()
            .unwrap();
        assert!(matches!(
            err,
            InterventionError::InvalidWindow { index: 0, start: 10, end: 5, .. }
        ));
        assert!(err.to_string().contains("MASKS"));
    }

    #[test]
    fn unknown_parameter_fails() {
        let p = InterventionParam::new(InterventionKind::Lockdown, 0, 3).with("curfew", 1.0);
        let err = p.validate(2).unwrap_err();
        assert!(matches!(err, InterventionError::UnknownParameter { index: 2, ref name, .. } if name == "curfew"));
    }

    #[test]
    fn out_of_range_parameter_fails() {
        let p = InterventionParam::new(InterventionKind::Masks, 0, 3).with("incoming", 1.5);
        assert!(matches!(p.validate(0), Err(InterventionError::InvalidParameter { .. })));

        let p = InterventionParam::new(InterventionKind::Vaccination, 0, 3).with("max_doses", 0.0);
        assert!(p.validate(0).is_err());

        let p = InterventionParam::new(InterventionKind::Masks, 0, 3).with("outgoing", f64::NAN);
        assert!(p.validate(0).is_err());
    }

    #[test]
    fn json_form() {
        let json = r#"[
            { "kind": "SCHOOL_CLOSURE", "start_day": 3, "end_day": 9, "params": { "fraction": 0.5 } },
            { "kind": "TESTING", "start_day": 0, "end_day": 60 }
        ]"#;
        let list: Vec<InterventionParam> = serde_json::from_str(json).unwrap();
        assert_eq!(list[0].kind, InterventionKind::SchoolClosure);
        assert_eq!(list[0].get("fraction"), 0.5);
        assert!(list[1].params.is_empty());
        assert!(Interventions::new(list).is_ok());
    }
}

// ── Scheduler ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod scheduler {
    use crate::{InterventionKind, InterventionParam, Interventions};

    use InterventionKind::*;

    #[test]
    fn masks_window() {
        let mut env = super::helpers::env();
        let mut iv = Interventions::new(vec![InterventionParam::new(Masks, 5, 10)]).unwrap();

        iv.step(4, &mut env);
        assert!(!iv.is_active(Masks));
        assert!(iv.policies().masks.is_none());

        let changes = iv.step(5, &mut env);
        assert_eq!(changes.activated, vec![Masks]);
        assert!(iv.is_active(Masks));
        assert_eq!(iv.policies().masks.unwrap().incoming, 0.5);

        iv.step(9, &mut env);
        assert!(iv.is_active(Masks));

        let changes = iv.step(10, &mut env);
        assert_eq!(changes.deactivated, vec![Masks]);
        assert!(!iv.is_active(Masks));
        assert!(iv.policies().is_empty());
    }

    #[test]
    fn day_zero_activation() {
        let mut env = super::helpers::env();
        let mut iv = Interventions::new(vec![
            InterventionParam::new(Testing, 0, 30),
            InterventionParam::new(Lockdown, 1, 30),
        ])
        .unwrap();
        let changes = iv.step(0, &mut env);
        assert_eq!(changes.activated, vec![Testing]);
        assert_eq!(iv.pending_count(), 1);
        assert!(iv.policies().testing.is_some());
        assert!(iv.policies().lockdown.is_none());
    }

    #[test]
    fn skipped_days_catch_up() {
        let mut env = super::helpers::env();
        let mut iv = Interventions::new(vec![
            InterventionParam::new(Masks, 2, 4),
            InterventionParam::new(SocialDistancing, 3, 20),
        ])
        .unwrap();
        let changes = iv.step(6, &mut env);
        assert_eq!(changes.activated, vec![Masks, SocialDistancing]);
        assert_eq!(changes.deactivated, vec![Masks]);
        assert!(iv.policies().masks.is_none());
        assert!(iv.policies().distancing.is_some());
    }

    #[test]
    fn equal_start_days_follow_config_order() {
        let mut env = super::helpers::env();
        let mut iv = Interventions::new(vec![
            InterventionParam::new(Masks, 1, 5).with("compliance", 0.2),
            InterventionParam::new(Vaccination, 1, 5),
            InterventionParam::new(Masks, 1, 9).with("compliance", 0.9),
        ])
        .unwrap();
        let changes = iv.step(1, &mut env);
        assert_eq!(changes.activated, vec![Masks, Vaccination, Masks]);
        // Later activation wins.
        assert_eq!(iv.policies().masks.unwrap().compliance, 0.9);

        iv.step(5, &mut env);
        assert_eq!(iv.policies().masks.unwrap().compliance, 0.9);
        assert!(iv.policies().vaccination.is_none());
    }

    #[test]
    fn closure_closes_prefix_and_reopens_it() {
        let mut env = super::helpers::env();
        let mut iv =
            Interventions::new(vec![InterventionParam::new(SchoolClosure, 2, 4).with("fraction", 0.5)])
                .unwrap();
        iv.step(2, &mut env);
        let closed: Vec<bool> = (0..4)
            .map(|i| env.building(epi_core::BuildingId(i)).is_closed())
            .collect();
        assert_eq!(closed, vec![true, true, false, false]);

        iv.step(4, &mut env);
        assert!(env.buildings().iter().all(|b| !b.is_closed()));
    }

    #[test]
    fn overlapping_closures_keep_shared_buildings_closed() {
        let mut env = super::helpers::env();
        let mut iv = Interventions::new(vec![
            InterventionParam::new(WorkplaceClosure, 0, 3).with("fraction", 1.0),
            InterventionParam::new(WorkplaceClosure, 1, 6).with("fraction", 0.34),
        ])
        .unwrap();
        iv.step(0, &mut env);
        iv.step(1, &mut env);
        iv.step(3, &mut env);
        // round(3 × 0.34) = 1: only the first workplace is still held.
        let b = |i| env.building(epi_core::BuildingId(i)).is_closed();
        assert!(b(4));
        assert!(!b(5));
        assert!(!b(6));
        // Schools untouched.
        assert!(!b(0));
    }

    #[test]
    fn reset_replays_day_zero() {
        let mut env = super::helpers::env();
        let mut iv = Interventions::new(vec![
            InterventionParam::new(SchoolClosure, 0, 2),
            InterventionParam::new(Masks, 3, 8),
        ])
        .unwrap();
        iv.step(0, &mut env);
        iv.step(3, &mut env);
        assert!(!iv.is_active(SchoolClosure));
        assert!(iv.is_active(Masks));

        env.reset();
        let changes = iv.reset(&mut env);
        assert_eq!(changes.activated, vec![SchoolClosure]);
        assert!(!iv.is_active(Masks));
        assert_eq!(iv.pending_count(), 1);
        assert!(env.building(epi_core::BuildingId(0)).is_closed());
    }

    #[test]
    fn single_day_window_holds_for_its_day() {
        let mut env = super::helpers::env();
        let mut iv = Interventions::new(vec![InterventionParam::new(Masks, 3, 3)]).unwrap();
        iv.step(2, &mut env);
        assert!(!iv.is_active(Masks));

        let changes = iv.step(3, &mut env);
        assert_eq!(changes.activated, vec![Masks]);
        assert!(changes.deactivated.is_empty());
        assert!(iv.is_active(Masks));
        assert!(iv.policies().masks.is_some());

        let changes = iv.step(4, &mut env);
        assert_eq!(changes.deactivated, vec![Masks]);
        assert!(!iv.is_active(Masks));
        assert!(iv.policies().masks.is_none());
    }

    #[test]
    fn single_day_closure_reopens_next_day() {
        let mut env = super::helpers::env();
        let mut iv = Interventions::new(vec![InterventionParam::new(SchoolClosure, 0, 0)]).unwrap();
        iv.step(0, &mut env);
        assert!(env.building(epi_core::BuildingId(0)).is_closed());
        iv.step(1, &mut env);
        assert!(!env.building(epi_core::BuildingId(0)).is_closed());
        assert_eq!(iv.active_count(), 0);
    }
}
