//! Property tests for identity assignment and camera geometry.

use std::collections::HashSet;

use obstacle_track::{
    BoundingBox, FixedDepth, GeometryConfig, GeometryModel, IdentityAssigner, IdentityRegistry,
    ObjectId, TrackState,
};
use proptest::prelude::*;

fn centre() -> impl Strategy<Value = (f32, f32)> {
    (0u16..1280, 0u16..720).prop_map(|(x, y)| (x as f32, y as f32))
}

fn boxes(centres: &[(f32, f32)]) -> Vec<BoundingBox> {
    centres
        .iter()
        .map(|&(cx, cy)| BoundingBox::from_xywh(cx, cy, 30.0, 60.0))
        .collect()
}

fn install(assigner: &IdentityAssigner, registry: &mut IdentityRegistry, dets: &[BoundingBox]) {
    let next = assigner.assign(dets, registry);
    registry.replace(next);
}

fn model(h: f64, v: f64, offsets: (f64, f64, f64)) -> GeometryModel {
    GeometryModel::new(GeometryConfig {
        horizontal_fov_deg: h,
        vertical_fov_deg: v,
        x_offset: offsets.0,
        y_offset: offsets.1,
        z_offset: offsets.2,
    })
    .unwrap()
}

proptest! {
    #[test]
    fn prop_first_frame_ids_in_input_order(centres in prop::collection::vec(centre(), 0..12)) {
        let dets = boxes(&centres);
        let next = IdentityAssigner::default().assign(&dets, &IdentityRegistry::new());

        prop_assert_eq!(next.len(), dets.len());
        for (i, det) in dets.iter().enumerate() {
            prop_assert_eq!(next.bbox(ObjectId(i as u32)), Some(det));
        }
    }

    #[test]
    fn prop_ids_unique_and_every_detection_placed(
        first in prop::collection::vec(centre(), 0..10),
        second in prop::collection::vec(centre(), 0..10),
    ) {
        let assigner = IdentityAssigner::default();
        let mut registry = IdentityRegistry::new();
        install(&assigner, &mut registry, &boxes(&first));
        let previous: HashSet<ObjectId> = registry.ids().collect();

        let dets = boxes(&second);
        install(&assigner, &mut registry, &dets);

        // Every previous id survives (no eviction configured) and every
        // detection lands on exactly one id.
        let current: HashSet<ObjectId> = registry.ids().collect();
        prop_assert!(previous.is_subset(&current));
        prop_assert_eq!(current.len(), previous.len().max(dets.len()));

        let fresh: Vec<BoundingBox> = registry
            .iter()
            .filter(|(_, t)| t.state != TrackState::Missed)
            .map(|(_, t)| t.bbox)
            .collect();
        prop_assert_eq!(fresh.len(), dets.len());
        for det in &dets {
            let wanted = dets.iter().filter(|d| *d == det).count();
            let found = fresh.iter().filter(|b| *b == det).count();
            prop_assert_eq!(wanted, found);
        }
    }

    #[test]
    fn prop_small_motion_keeps_id(
        centres in prop::collection::vec(centre(), 1..8),
        dx in -3.0f32..3.0,
        dy in -3.0f32..3.0,
    ) {
        // Keep objects well apart so a few pixels of motion is unambiguous.
        let spaced: Vec<(f32, f32)> = centres
            .iter()
            .enumerate()
            .map(|(i, &(x, y))| (x + i as f32 * 1500.0, y))
            .collect();
        let assigner = IdentityAssigner::default();
        let mut registry = IdentityRegistry::new();
        install(&assigner, &mut registry, &boxes(&spaced));

        let moved: Vec<(f32, f32)> = spaced
            .iter()
            .rev()
            .map(|&(x, y)| (x + dx, y + dy))
            .collect();
        install(&assigner, &mut registry, &boxes(&moved));

        for (i, &(x, y)) in spaced.iter().enumerate() {
            let (cx, cy) = registry.bbox(ObjectId(i as u32)).unwrap().center();
            prop_assert!((cx - (x + dx) as f64).abs() < 1e-2);
            prop_assert!((cy - (y + dy) as f64).abs() < 1e-2);
        }
    }

    #[test]
    fn prop_small_motion_keeps_id_past_new_object(
        (x, y) in centre(),
        dx in -3.0f32..3.0,
        dy in -3.0f32..3.0,
        ox in -40.0f32..40.0,
        oy in -40.0f32..40.0,
    ) {
        // Two tracks 200 px apart and a new object listed first, somewhere
        // between them but never closer to either than the motion.
        let assigner = IdentityAssigner::default();
        let mut registry = IdentityRegistry::new();
        install(&assigner, &mut registry, &boxes(&[(x, y), (x + 200.0, y)]));

        let intruder = (x + 100.0 + ox, y + oy);
        let moved = [(x + dx, y + dy), (x + 200.0 - dx, y - dy)];
        install(&assigner, &mut registry, &boxes(&[intruder, moved[0], moved[1]]));

        prop_assert_eq!(registry.len(), 3);
        for (i, &(mx, my)) in moved.iter().enumerate() {
            let (cx, cy) = registry.bbox(ObjectId(i as u32)).unwrap().center();
            prop_assert!((cx - mx as f64).abs() < 1e-2);
            prop_assert!((cy - my as f64).abs() < 1e-2);
        }
        let (cx, cy) = registry.bbox(ObjectId(2)).unwrap().center();
        prop_assert!((cx - intruder.0 as f64).abs() < 1e-2);
        prop_assert!((cy - intruder.1 as f64).abs() < 1e-2);
    }

    #[test]
    fn prop_unmatched_detection_gets_next_id(extra in centre()) {
        let assigner = IdentityAssigner::default();
        let mut registry = IdentityRegistry::new();
        install(&assigner, &mut registry, &boxes(&[(100.0, 100.0), (900.0, 500.0)]));
        install(&assigner, &mut registry, &boxes(&[(101.0, 100.0), (899.0, 501.0), extra]));

        prop_assert_eq!(registry.len(), 3);
        prop_assert_eq!(registry.max_id(), Some(ObjectId(2)));
    }

    #[test]
    fn prop_vehicle_frame_is_pure_offset(
        centres in prop::collection::vec(centre(), 1..8),
        h in 1.0f64..179.0,
        v in 1.0f64..179.0,
        ox in -5.0f64..5.0,
        oy in -5.0f64..5.0,
        oz in -5.0f64..5.0,
        z in 0.0f64..100.0,
    ) {
        let mut registry = IdentityRegistry::new();
        install(&IdentityAssigner::default(), &mut registry, &boxes(&centres));
        let geometry = model(h, v, (ox, oy, oz));

        let camera = geometry
            .dist_from_camera(&registry, &FixedDepth::new(z), 1280, 720)
            .unwrap();
        let vehicle = geometry.dist_from_car(&camera);

        prop_assert_eq!(
            camera.keys().collect::<Vec<_>>(),
            vehicle.keys().collect::<Vec<_>>()
        );
        for (id, c) in &camera {
            let delta = vehicle[id] - *c;
            prop_assert!((delta.x - ox).abs() < 1e-9);
            prop_assert!((delta.y - oy).abs() < 1e-9);
            prop_assert!((delta.z - oz).abs() < 1e-9);
        }
    }

    #[test]
    fn prop_centered_box_on_axis(
        h in 1.0f64..179.0,
        v in 1.0f64..179.0,
        z in 0.0f64..100.0,
        w in (1u16..100).prop_map(|n| n as f32 * 2.0),
        bh in (1u16..100).prop_map(|n| n as f32 * 2.0),
    ) {
        let mut registry = IdentityRegistry::new();
        let centred = BoundingBox::from_xywh(640.0, 360.0, w, bh);
        install(&IdentityAssigner::default(), &mut registry, &[centred]);

        let p = model(h, v, (0.0, 0.0, 0.0))
            .camera_position(ObjectId(0), &registry, &FixedDepth::new(z), 1280, 720)
            .unwrap();
        prop_assert_eq!(p.x, 0.0);
        prop_assert_eq!(p.y, 0.0);
    }

    #[test]
    fn prop_offsets_scale_linearly_with_depth(
        c in centre(),
        h in 1.0f64..179.0,
        v in 1.0f64..179.0,
        z in 0.1f64..50.0,
        k in 1.0f64..10.0,
    ) {
        let mut registry = IdentityRegistry::new();
        install(&IdentityAssigner::default(), &mut registry, &boxes(&[c]));
        let geometry = model(h, v, (0.0, 0.0, 0.0));

        let near = geometry
            .camera_position(ObjectId(0), &registry, &FixedDepth::new(z), 1280, 720)
            .unwrap();
        let far = geometry
            .camera_position(ObjectId(0), &registry, &FixedDepth::new(z * k), 1280, 720)
            .unwrap();

        prop_assert!((far.x - near.x * k).abs() <= 1e-9 * (1.0 + far.x.abs()));
        prop_assert!((far.y - near.y * k).abs() <= 1e-9 * (1.0 + far.y.abs()));
        prop_assert!(far.x.abs() >= near.x.abs());
        prop_assert!(far.y.abs() >= near.y.abs());
    }
}
