//! Dropped-item stacking and merge tests

#[cfg(test)]
mod tests {
    use orefield::{
        DropOutcome, FlatGenerator, ItemKind, MovingId, MovingKind, World, WorldConfig,
    };

    fn make_world() -> World {
        let config = WorldConfig {
            width_tiles: 64,
            height_tiles: 64,
            seed: 1,
            pickup_radius: 16,
        };
        World::new(config, Box::new(FlatGenerator)).unwrap()
    }

    fn quantity(world: &World, id: MovingId) -> u32 {
        match world.moving(id).unwrap().kind {
            MovingKind::DroppedItem { quantity, .. } => quantity,
            MovingKind::Unit => panic!("not a dropped item"),
        }
    }

    // -----------------------------------------------------------------------
    // Spawning and merging
    // -----------------------------------------------------------------------

    #[test]
    fn first_drop_spawns_a_stack() {
        let mut world = make_world();
        let outcome = world
            .spawn_dropped_item(ItemKind::IronOre, 30, 100, 100)
            .unwrap();
        let DropOutcome::Spawned(id) = outcome else {
            panic!("expected a spawn, got {outcome:?}");
        };
        assert_eq!(quantity(&world, id), 30);
        assert_eq!(world.stats().dropped_items, 1);
    }

    #[test]
    fn nearby_same_kind_stack_absorbs_the_drop() {
        let mut world = make_world();
        let DropOutcome::Spawned(first) = world
            .spawn_dropped_item(ItemKind::IronOre, 30, 100, 100)
            .unwrap()
        else {
            panic!("seed stack failed");
        };
        let outcome = world
            .spawn_dropped_item(ItemKind::IronOre, 40, 110, 100)
            .unwrap();
        assert_eq!(outcome, DropOutcome::Merged(first));
        assert_eq!(quantity(&world, first), 70);
        assert_eq!(world.stats().dropped_items, 1);
    }

    #[test]
    fn different_kinds_do_not_merge() {
        let mut world = make_world();
        world
            .spawn_dropped_item(ItemKind::IronOre, 30, 100, 100)
            .unwrap();
        let outcome = world
            .spawn_dropped_item(ItemKind::CopperOre, 30, 110, 100)
            .unwrap();
        assert!(matches!(outcome, DropOutcome::Spawned(_)));
        assert_eq!(world.stats().dropped_items, 2);
    }

    #[test]
    fn overflow_tops_up_then_spawns_the_remainder() {
        let mut world = make_world();
        let DropOutcome::Spawned(first) = world
            .spawn_dropped_item(ItemKind::IronOre, 80, 100, 100)
            .unwrap()
        else {
            panic!("seed stack failed");
        };
        // 80 + 50 exceeds the stack cap of 100: 20 tops up, 30 respawn.
        let outcome = world
            .spawn_dropped_item(ItemKind::IronOre, 50, 110, 100)
            .unwrap();
        let DropOutcome::Spawned(second) = outcome else {
            panic!("expected a remainder spawn, got {outcome:?}");
        };
        assert_eq!(quantity(&world, first), 100);
        assert_eq!(quantity(&world, second), 30);
    }

    #[test]
    fn full_stacks_are_not_merge_targets() {
        let mut world = make_world();
        let DropOutcome::Spawned(first) = world
            .spawn_dropped_item(ItemKind::IronOre, 80, 100, 100)
            .unwrap()
        else {
            panic!("seed stack failed");
        };
        assert_eq!(
            world
                .spawn_dropped_item(ItemKind::IronOre, 20, 110, 100)
                .unwrap(),
            DropOutcome::Merged(first)
        );
        assert_eq!(quantity(&world, first), 100);
        // The stack is full now; a further drop nearby must stand alone.
        let outcome = world
            .spawn_dropped_item(ItemKind::IronOre, 10, 112, 100)
            .unwrap();
        assert!(matches!(outcome, DropOutcome::Spawned(_)));
        assert_eq!(world.stats().dropped_items, 2);
    }

    #[test]
    fn blocked_drop_changes_nothing() {
        let mut world = make_world();
        let DropOutcome::Spawned(first) = world
            .spawn_dropped_item(ItemKind::IronOre, 80, 100, 100)
            .unwrap()
        else {
            panic!("seed stack failed");
        };
        // Dropping 50 right on top of the stack needs a remainder spawn, but
        // the drop point collides with the stack itself. The merge must not
        // have happened either.
        let outcome = world
            .spawn_dropped_item(ItemKind::IronOre, 50, 100, 100)
            .unwrap();
        assert_eq!(outcome, DropOutcome::Blocked);
        assert_eq!(quantity(&world, first), 80);
        assert_eq!(world.stats().dropped_items, 1);
    }

    #[test]
    fn far_away_stacks_are_ignored() {
        let mut world = make_world();
        world
            .spawn_dropped_item(ItemKind::IronOre, 30, 100, 100)
            .unwrap();
        let outcome = world
            .spawn_dropped_item(ItemKind::IronOre, 30, 300, 300)
            .unwrap();
        assert!(matches!(outcome, DropOutcome::Spawned(_)));
        assert_eq!(world.stats().dropped_items, 2);
    }

    // -----------------------------------------------------------------------
    // Removal
    // -----------------------------------------------------------------------

    #[test]
    fn item_removal_is_idempotent() {
        let mut world = make_world();
        let DropOutcome::Spawned(id) = world
            .spawn_dropped_item(ItemKind::IronOre, 30, 100, 100)
            .unwrap()
        else {
            panic!("seed stack failed");
        };
        assert!(world.remove_moving(id).unwrap());
        assert_eq!(world.stats().dropped_items, 0);
        assert!(!world.remove_moving(id).unwrap());
    }
}
