//! Unit tests for epi-agent.

#[cfg(test)]
mod helpers {
    use epi_core::{AgentId, AgentRng, BuildingId, Point, Polygon, Timestamp};
    use epi_intervention::ActivePolicies;
    use epi_schedule::{Activity, Role, Schedule};
    use epi_spatial::{
        BuildingCategory, BuildingFootprint, Environment, EnvironmentConfig, Geometry, RoadLine,
    };

    use crate::{Compliance, Individual, StepContext};

    pub const HOME: BuildingId = BuildingId(0);
    pub const SCHOOL: BuildingId = BuildingId(1);
    pub const HOSPITAL: BuildingId = BuildingId(2);
    pub const AMENITY: BuildingId = BuildingId(3);
    pub const OFFICE: BuildingId = BuildingId(4);
    pub const GROCER: BuildingId = BuildingId(5);

    /// Street along y = 0 with a node every 20 m; buildings 6 m north of it.
    ///
    ///   B0 residential (2, 6)     B1 school        (41, 6)
    ///   B2 hospital    (81, 6)    B3 amenity       (101, 6)
    ///   B4 office      (141, 6)   B5 ess. workplace (161, 6)
    ///   B6 residential (181, 6)
    pub fn geometry() -> Geometry {
        let cats = [
            (BuildingCategory::Residential, 2.0),
            (BuildingCategory::School, 41.0),
            (BuildingCategory::Hospital, 81.0),
            (BuildingCategory::EssentialAmenity, 101.0),
            (BuildingCategory::NonEssentialWorkplace, 141.0),
            (BuildingCategory::EssentialWorkplace, 161.0),
            (BuildingCategory::Residential, 181.0),
        ];
        let buildings = cats
            .into_iter()
            .map(|(category, x)| BuildingFootprint {
                category,
                polygon: Polygon::rect(Point::new(x - 2.0, 4.0), Point::new(x + 2.0, 8.0)),
            })
            .collect();
        let points = (0..=10).map(|i| Point::new(i as f64 * 20.0, 0.0)).collect();
        Geometry { buildings, roads: vec![RoadLine { points }] }
    }

    pub fn env_with_beds(beds: u32) -> Environment {
        let config = EnvironmentConfig { hospital_beds: beds, ..EnvironmentConfig::default() };
        Environment::build(&geometry(), &config).unwrap()
    }

    pub fn env() -> Environment {
        env_with_beds(20)
    }

    /// A 40-year-old at `HOME` doing `activity` all day, complying with
    /// everything.
    pub fn person(id: u32, work: Option<BuildingId>, essential: bool, activity: Activity) -> Individual {
        Individual::new(
            AgentId(id),
            40,
            Role::Worker,
            HOME,
            work,
            essential,
            vec![AMENITY],
            Schedule::constant(activity).unwrap(),
            Compliance::ALWAYS,
        )
    }

    pub fn rng(id: u32) -> AgentRng {
        AgentRng::new(7, AgentId(id))
    }

    pub fn ctx(policies: &ActivePolicies) -> StepContext<'_> {
        StepContext { now: Timestamp::from_day_time(0, 9 * 3600), tick_secs: 60, policies }
    }
}

// ── Movement & activity ───────────────────────────────────────────────────────

#[cfg(test)]
mod movement {
    use epi_core::{HealthState, Timestamp};
    use epi_intervention::{ActivePolicies, LockdownPolicy};
    use epi_schedule::{Activity, Schedule};

    use super::helpers::*;
    use crate::{MovementConfig, MovementEvents};

    fn lockdown(leisure_travel: f64) -> ActivePolicies {
        ActivePolicies {
            lockdown: Some(LockdownPolicy { compliance: 1.0, leisure_travel }),
            ..ActivePolicies::default()
        }
    }

    #[test]
    fn fast_walker_crosses_several_nodes_in_one_tick() {
        let mut env = env();
        let mut p = person(0, Some(SCHOOL), false, Activity::Work);
        let mut rng = rng(0);
        p.place_at_home(&mut env, &mut rng);
        assert_eq!(env.building(HOME).occupant_count(), 1);

        // 84 m budget; the whole trip is under 60 m.
        let none = ActivePolicies::default();
        let mut events = MovementEvents::default();
        p.step(&mut env, &ctx(&none), &MovementConfig::default(), &mut rng, &mut events);

        assert!(!p.is_travelling());
        assert_eq!(p.building, SCHOOL);
        assert_eq!(p.activity, Activity::Work);
        assert_eq!(p.location, env.building(SCHOOL).node);
        assert!(env.building(SCHOOL).footprint.contains(p.position));
        assert_eq!(env.building(HOME).occupant_count(), 0);
        assert_eq!(env.building(SCHOOL).occupants(p.room), &[p.id]);
    }

    #[test]
    fn slow_walker_is_in_no_room_while_travelling() {
        let mut env = env();
        let mut p = person(0, Some(SCHOOL), false, Activity::Work);
        let mut rng = rng(0);
        p.place_at_home(&mut env, &mut rng);

        let slow = MovementConfig { speed_m_per_s: 0.1, ..MovementConfig::default() };
        let none = ActivePolicies::default();
        let mut events = MovementEvents::default();
        p.step(&mut env, &ctx(&none), &slow, &mut rng, &mut events);
        assert!(p.is_travelling());
        assert_eq!(p.destination(), Some(SCHOOL));
        assert_eq!(p.occupancy(), None);
        assert_eq!(env.building(HOME).occupant_count(), 0);

        // 6 m per tick, trip under 60 m.
        for _ in 0..12 {
            p.step(&mut env, &ctx(&none), &slow, &mut rng, &mut events);
        }
        assert_eq!(p.occupancy(), Some((SCHOOL, p.room)));
    }

    #[test]
    fn work_room_is_reused_other_rooms_are_not_remembered() {
        let mut env = env();
        let mut p = person(0, Some(SCHOOL), false, Activity::Work);
        let mut rng = rng(0);
        p.place_at_home(&mut env, &mut rng);
        let none = ActivePolicies::default();
        let cfg = MovementConfig::default();
        let mut events = MovementEvents::default();

        p.step(&mut env, &ctx(&none), &cfg, &mut rng, &mut events);
        let first = p.room;
        assert_eq!(p.work_room(), Some(first));

        for _ in 0..5 {
            p.schedule = Schedule::constant(Activity::Sleep).unwrap();
            p.step(&mut env, &ctx(&none), &cfg, &mut rng, &mut events);
            assert_eq!(p.building, HOME);
            p.schedule = Schedule::constant(Activity::Work).unwrap();
            p.step(&mut env, &ctx(&none), &cfg, &mut rng, &mut events);
            assert_eq!(p.building, SCHOOL);
            assert_eq!(p.room, first);
        }
    }

    #[test]
    fn closed_workplace_sends_home() {
        let mut env = env();
        env.building_mut(SCHOOL).close();
        let mut p = person(0, Some(SCHOOL), false, Activity::Work);
        let mut rng = rng(0);
        p.place_at_home(&mut env, &mut rng);
        let none = ActivePolicies::default();
        p.step(&mut env, &ctx(&none), &MovementConfig::default(), &mut rng, &mut MovementEvents::default());
        assert_eq!(p.building, HOME);
        assert_eq!(p.activity, Activity::Work);
        assert!(!p.is_travelling());
    }

    #[test]
    fn lockdown_keeps_non_essential_workers_home() {
        let mut env = env();
        let policies = lockdown(0.0);
        let cfg = MovementConfig::default();
        let mut events = MovementEvents::default();

        let mut office = person(0, Some(OFFICE), false, Activity::Work);
        let mut grocer = person(1, Some(GROCER), true, Activity::Work);
        let (mut r0, mut r1) = (rng(0), rng(1));
        office.place_at_home(&mut env, &mut r0);
        grocer.place_at_home(&mut env, &mut r1);

        for _ in 0..5 {
            office.step(&mut env, &ctx(&policies), &cfg, &mut r0, &mut events);
            grocer.step(&mut env, &ctx(&policies), &cfg, &mut r1, &mut events);
        }
        assert_eq!(office.building, HOME);
        assert_eq!(grocer.building, GROCER);
    }

    #[test]
    fn lockdown_without_leisure_travel_keeps_everyone_home() {
        let mut env = env();
        let policies = lockdown(0.0);
        let mut p = person(0, None, false, Activity::Leisure);
        let mut rng = rng(0);
        p.place_at_home(&mut env, &mut rng);
        for _ in 0..10 {
            p.step(&mut env, &ctx(&policies), &MovementConfig::default(), &mut rng, &mut MovementEvents::default());
        }
        assert_eq!(p.building, HOME);
    }

    #[test]
    fn leisure_stays_at_amenity() {
        let mut env = env();
        let mut p = person(0, None, false, Activity::Leisure);
        let mut rng = rng(0);
        p.place_at_home(&mut env, &mut rng);
        let none = ActivePolicies::default();
        let sticky = MovementConfig { leisure_stay_prob: 1.0, ..MovementConfig::default() };
        let mut events = MovementEvents::default();
        for _ in 0..3 {
            p.step(&mut env, &ctx(&none), &sticky, &mut rng, &mut events);
        }
        assert_eq!(p.building, AMENITY);
        let room = p.room;
        for _ in 0..10 {
            p.step(&mut env, &ctx(&none), &sticky, &mut rng, &mut events);
            assert_eq!(p.room, room);
        }
    }

    #[test]
    fn closed_amenity_sends_home() {
        let mut env = env();
        env.building_mut(AMENITY).close();
        let mut p = person(0, None, false, Activity::Leisure);
        let mut rng = rng(0);
        p.place_at_home(&mut env, &mut rng);
        let none = ActivePolicies::default();
        for _ in 0..10 {
            p.step(&mut env, &ctx(&none), &MovementConfig::default(), &mut rng, &mut MovementEvents::default());
            assert_eq!(p.building, HOME);
            assert!(!p.is_travelling());
        }
        assert_eq!(p.activity, Activity::Leisure);
        assert_eq!(env.building(AMENITY).occupant_count(), 0);
    }

    #[test]
    fn amenity_closing_while_there_sends_home() {
        let mut env = env();
        let mut p = person(0, None, false, Activity::Leisure);
        let mut rng = rng(0);
        p.place_at_home(&mut env, &mut rng);
        let none = ActivePolicies::default();
        let sticky = MovementConfig { leisure_stay_prob: 1.0, ..MovementConfig::default() };
        let mut events = MovementEvents::default();
        for _ in 0..3 {
            p.step(&mut env, &ctx(&none), &sticky, &mut rng, &mut events);
        }
        assert_eq!(p.building, AMENITY);

        env.building_mut(AMENITY).close();
        for _ in 0..3 {
            p.step(&mut env, &ctx(&none), &sticky, &mut rng, &mut events);
        }
        assert_eq!(p.building, HOME);
        assert_eq!(env.building(AMENITY).occupant_count(), 0);
    }

    #[test]
    fn isolation_overrides_schedule() {
        let mut env = env();
        let mut p = person(0, Some(SCHOOL), false, Activity::Work);
        let mut rng = rng(0);
        p.place_at_home(&mut env, &mut rng);
        let none = ActivePolicies::default();
        let c = ctx(&none);
        p.isolating_until = Some(c.now.plus_secs(86_400));
        assert!(p.is_isolating(c.now));
        p.step(&mut env, &c, &MovementConfig::default(), &mut rng, &mut MovementEvents::default());
        assert_eq!(p.activity, Activity::Isolation);
        assert_eq!(p.building, HOME);

        // Deadline reached: back to the schedule.
        let later = crate::StepContext { now: Timestamp(c.now.0 + 86_400), ..c };
        assert!(!p.is_isolating(later.now));
        p.step(&mut env, &later, &MovementConfig::default(), &mut rng, &mut MovementEvents::default());
        assert_eq!(p.building, SCHOOL);
    }

    #[test]
    fn second_severe_case_is_refused_when_beds_run_out() {
        let mut env = env_with_beds(1);
        let none = ActivePolicies::default();
        let cfg = MovementConfig::default();
        let mut events = MovementEvents::default();

        let mut a = person(0, None, false, Activity::Sleep);
        let mut b = person(1, None, false, Activity::Sleep);
        let (mut ra, mut rb) = (rng(0), rng(1));
        a.place_at_home(&mut env, &mut ra);
        b.place_at_home(&mut env, &mut rb);
        a.health = HealthState::SymptomaticSevere;
        b.health = HealthState::SymptomaticSevere;

        a.step(&mut env, &ctx(&none), &cfg, &mut ra, &mut events);
        b.step(&mut env, &ctx(&none), &cfg, &mut rb, &mut events);

        assert_eq!(events.admissions, vec![(a.id, HOSPITAL)]);
        assert_eq!(events.refusals, vec![b.id]);
        assert_eq!(a.hospital, Some(HOSPITAL));
        assert_eq!(a.activity, Activity::Hospitalisation);
        assert_eq!(a.destination(), Some(HOSPITAL));
        assert_eq!(b.hospital, None);
        assert_eq!(b.activity, Activity::Isolation);
        assert_eq!(b.building, HOME);
        assert_eq!(env.occupied_beds(), 1);

        // The admitted patient reaches the bed, stays put and is not
        // admitted twice.
        for _ in 0..4 {
            a.step(&mut env, &ctx(&none), &cfg, &mut ra, &mut events);
        }
        assert_eq!(events.admissions.len(), 1);
        assert_eq!(a.building, HOSPITAL);

        a.discharge(&mut env);
        assert_eq!(env.occupied_beds(), 0);
        assert_eq!(a.hospital, None);
    }

    #[test]
    fn deceased_are_frozen_and_vacated() {
        let mut env = env();
        let mut p = person(0, Some(SCHOOL), false, Activity::Work);
        let mut rng = rng(0);
        p.place_at_home(&mut env, &mut rng);
        p.health = HealthState::Deceased;
        p.vacate(&mut env);
        assert_eq!(env.building(HOME).occupant_count(), 0);

        let before = p.position;
        p.step(&mut env, &ctx(&ActivePolicies::default()), &MovementConfig::default(), &mut rng, &mut MovementEvents::default());
        assert_eq!(p.position, before);
        assert_eq!(p.building, HOME);
        assert_eq!(p.occupancy(), None);
    }
}

// ── Population ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod population {
    use epi_core::{AgentId, BuildingId, Point, Polygon};
    use epi_intervention::ActivePolicies;
    use epi_spatial::{BuildingCategory, BuildingFootprint, Environment, EnvironmentConfig, Geometry, RoadLine};

    use super::helpers;
    use crate::{AgentError, Population, PopulationConfig, StepContext};

    fn config(size: u32) -> PopulationConfig {
        PopulationConfig { size, ..PopulationConfig::default() }
    }

    #[test]
    fn everyone_starts_at_home() {
        let mut env = helpers::env();
        let pop = Population::generate(&mut env, &config(200), 1).unwrap();
        assert_eq!(pop.len(), 200);
        let occupants: usize = env.buildings().iter().map(|b| b.occupant_count()).sum();
        assert_eq!(occupants, 200);
        for i in pop.individuals() {
            assert_eq!(i.building, i.home);
            assert_eq!(env.building(i.home).category, BuildingCategory::Residential);
            assert!(env.building(i.home).occupants(i.room).contains(&i.id));
        }
    }

    #[test]
    fn assignments_match_roles() {
        let mut env = helpers::env();
        let pop = Population::generate(&mut env, &config(500), 2).unwrap();
        for i in pop.individuals() {
            if let Some(w) = i.work {
                let cat = env.building(w).category;
                match i.age {
                    5..=17  => assert_eq!(cat, BuildingCategory::School),
                    18..=24 => assert_eq!(cat, BuildingCategory::University),
                    _       => assert!(cat.is_workplace()),
                }
                assert_eq!(i.essential, cat == BuildingCategory::EssentialWorkplace);
            }
            // One amenity in the town.
            assert_eq!(i.amenities, vec![helpers::AMENITY]);
        }
        // No university in the town, so university-age students have no work.
        assert!(pop.individuals().iter().filter(|i| (18..=24).contains(&i.age)).all(|i| i.work.is_none()));
        assert!(pop.individuals().iter().any(|i| i.work == Some(helpers::SCHOOL)));
    }

    #[test]
    fn same_seed_same_population() {
        let (mut e1, mut e2) = (helpers::env(), helpers::env());
        let a = Population::generate(&mut e1, &config(100), 9).unwrap();
        let b = Population::generate(&mut e2, &config(100), 9).unwrap();
        for (x, y) in a.individuals().iter().zip(b.individuals()) {
            assert_eq!((x.home, x.age, x.work), (y.home, y.age, y.work));
            assert_eq!(x.schedule, y.schedule);
            assert_eq!(x.compliance, y.compliance);
        }
        assert_eq!(a.snapshot(), b.snapshot());
    }

    #[test]
    fn reset_replays_initial_placement() {
        let mut env = helpers::env();
        let mut pop = Population::generate(&mut env, &config(50), 3).unwrap();
        let initial = pop.snapshot();

        let none = ActivePolicies::default();
        for t in 0..30 {
            let ctx = StepContext {
                now: epi_core::Timestamp::from_day_time(0, 8 * 3600 + t * 60),
                tick_secs: 60,
                policies: &none,
            };
            pop.step(&mut env, &ctx);
        }
        assert_ne!(pop.snapshot(), initial);

        env.reset();
        pop.reset(&mut env);
        assert_eq!(pop.snapshot(), initial);
    }

    #[test]
    fn rejects_empty_population_and_homeless_towns() {
        let mut env = helpers::env();
        assert!(matches!(
            Population::generate(&mut env, &config(0), 1),
            Err(AgentError::EmptyPopulation)
        ));

        let geometry = Geometry {
            buildings: vec![BuildingFootprint {
                category: BuildingCategory::School,
                polygon:  Polygon::rect(Point::new(0.0, 4.0), Point::new(4.0, 8.0)),
            }],
            roads: vec![RoadLine { points: vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0)] }],
        };
        let mut env = Environment::build(&geometry, &EnvironmentConfig::default()).unwrap();
        assert!(matches!(
            Population::generate(&mut env, &config(10), 1),
            Err(AgentError::NoResidentialBuildings)
        ));
    }

    #[test]
    fn rejects_fractions_over_one() {
        let mut env = helpers::env();
        let cfg = PopulationConfig { student_fraction: 0.6, retired_fraction: 0.6, ..config(10) };
        assert!(matches!(Population::generate(&mut env, &cfg, 1), Err(AgentError::InvalidConfig(_))));
        // Nothing was placed.
        assert_eq!(env.building(BuildingId(0)).occupant_count(), 0);
    }

    #[test]
    fn checked_lookup() {
        let mut env = helpers::env();
        let pop = Population::generate(&mut env, &config(5), 1).unwrap();
        assert!(pop.try_get(AgentId(4)).is_ok());
        assert!(matches!(pop.try_get(AgentId(5)), Err(AgentError::UnknownAgent(_))));
    }

    #[test]
    fn config_json_defaults() {
        let cfg: PopulationConfig = serde_json::from_str(r#"{ "size": 42 }"#).unwrap();
        assert_eq!(cfg.size, 42);
        assert_eq!(cfg.movement.speed_m_per_s, 1.4);
    }
}
