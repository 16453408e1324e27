//! Resource-node attachment graph tests

#[cfg(test)]
mod tests {
    use orefield::{
        ContainerId, Direction, FlatGenerator, ResourceCategory, TilePos, World, WorldConfig,
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

    // -----------------------------------------------------------------------
    // Attachment derivation
    // -----------------------------------------------------------------------

    #[test]
    fn facing_pair_attaches_symmetrically() {
        let mut world = make_world();
        let a = world
            .add_resource_node(
                TilePos::new(5, 5),
                Direction::Right,
                ResourceCategory::Item,
                ContainerId(1),
            )
            .unwrap();
        let b = world
            .add_resource_node(
                TilePos::new(6, 5),
                Direction::Left,
                ResourceCategory::Item,
                ContainerId(2),
            )
            .unwrap();
        assert_eq!(world.attached_nodes(a).unwrap(), &[b]);
        assert_eq!(world.attached_nodes(b).unwrap(), &[a]);
    }

    #[test]
    fn existing_node_attaches_when_partner_arrives() {
        let mut world = make_world();
        let a = world
            .add_resource_node(
                TilePos::new(5, 5),
                Direction::Up,
                ResourceCategory::Item,
                ContainerId(1),
            )
            .unwrap();
        assert!(world.attached_nodes(a).unwrap().is_empty());
        let b = world
            .add_resource_node(
                TilePos::new(5, 6),
                Direction::Down,
                ResourceCategory::Item,
                ContainerId(2),
            )
            .unwrap();
        // Adding b recomputed a's neighborhood.
        assert_eq!(world.attached_nodes(a).unwrap(), &[b]);
    }

    #[test]
    fn mismatched_category_does_not_attach() {
        let mut world = make_world();
        let a = world
            .add_resource_node(
                TilePos::new(5, 5),
                Direction::Right,
                ResourceCategory::Item,
                ContainerId(1),
            )
            .unwrap();
        world
            .add_resource_node(
                TilePos::new(6, 5),
                Direction::Left,
                ResourceCategory::Fluid,
                ContainerId(2),
            )
            .unwrap();
        assert!(world.attached_nodes(a).unwrap().is_empty());
    }

    #[test]
    fn same_direction_neighbors_do_not_attach() {
        let mut world = make_world();
        let a = world
            .add_resource_node(
                TilePos::new(5, 5),
                Direction::Right,
                ResourceCategory::Item,
                ContainerId(1),
            )
            .unwrap();
        world
            .add_resource_node(
                TilePos::new(6, 5),
                Direction::Right,
                ResourceCategory::Item,
                ContainerId(2),
            )
            .unwrap();
        assert!(world.attached_nodes(a).unwrap().is_empty());
    }

    #[test]
    fn removal_detaches_the_partner() {
        let mut world = make_world();
        let a = world
            .add_resource_node(
                TilePos::new(5, 5),
                Direction::Right,
                ResourceCategory::Item,
                ContainerId(1),
            )
            .unwrap();
        let b = world
            .add_resource_node(
                TilePos::new(6, 5),
                Direction::Left,
                ResourceCategory::Item,
                ContainerId(2),
            )
            .unwrap();
        assert!(world.remove_resource_node(a).unwrap());
        assert!(world.attached_nodes(b).unwrap().is_empty());
        assert!(!world.remove_resource_node(a).unwrap(), "removal idempotent");
    }

    // -----------------------------------------------------------------------
    // Replace semantics
    // -----------------------------------------------------------------------

    #[test]
    fn identical_node_is_a_no_op() {
        let mut world = make_world();
        let a = world
            .add_resource_node(
                TilePos::new(5, 5),
                Direction::Right,
                ResourceCategory::Item,
                ContainerId(1),
            )
            .unwrap();
        let again = world
            .add_resource_node(
                TilePos::new(5, 5),
                Direction::Right,
                ResourceCategory::Item,
                ContainerId(1),
            )
            .unwrap();
        assert_eq!(a, again);
    }

    #[test]
    fn different_container_shares_the_edge() {
        let mut world = make_world();
        let a = world
            .add_resource_node(
                TilePos::new(5, 5),
                Direction::Right,
                ResourceCategory::Item,
                ContainerId(1),
            )
            .unwrap();
        let b = world
            .add_resource_node(
                TilePos::new(5, 5),
                Direction::Right,
                ResourceCategory::Item,
                ContainerId(9),
            )
            .unwrap();
        assert_ne!(a, b);
        assert!(world.node(a).is_ok(), "first node untouched");
        let mut at = world.nodes_at(TilePos::new(5, 5)).unwrap();
        at.sort();
        let mut expected = vec![a, b];
        expected.sort();
        assert_eq!(at, expected);
    }

    #[test]
    fn categories_coexist_on_one_edge() {
        let mut world = make_world();
        let item = world
            .add_resource_node(
                TilePos::new(5, 5),
                Direction::Right,
                ResourceCategory::Item,
                ContainerId(1),
            )
            .unwrap();
        let fluid = world
            .add_resource_node(
                TilePos::new(5, 5),
                Direction::Right,
                ResourceCategory::Fluid,
                ContainerId(1),
            )
            .unwrap();
        assert_ne!(item, fluid);
        assert!(world.node(item).is_ok(), "adding the fluid node must not destroy the item node");
        assert!(world.node(fluid).is_ok());
    }

    #[test]
    fn edges_of_one_tile_are_independent() {
        let mut world = make_world();
        let right = world
            .add_resource_node(
                TilePos::new(5, 5),
                Direction::Right,
                ResourceCategory::Item,
                ContainerId(1),
            )
            .unwrap();
        let up = world
            .add_resource_node(
                TilePos::new(5, 5),
                Direction::Up,
                ResourceCategory::Item,
                ContainerId(1),
            )
            .unwrap();
        assert_ne!(right, up);
        let mut at = world.nodes_at(TilePos::new(5, 5)).unwrap();
        at.sort();
        let mut expected = vec![right, up];
        expected.sort();
        assert_eq!(at, expected);
    }

    // -----------------------------------------------------------------------
    // World edge
    // -----------------------------------------------------------------------

    #[test]
    fn node_facing_out_of_the_world_has_no_attachments() {
        let mut world = make_world();
        let a = world
            .add_resource_node(
                TilePos::new(0, 0),
                Direction::Left,
                ResourceCategory::Item,
                ContainerId(1),
            )
            .unwrap();
        assert!(world.attached_nodes(a).unwrap().is_empty());
    }
}
