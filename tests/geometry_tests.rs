//! Geometry and coordinate-conversion unit tests

#[cfg(test)]
mod tests {
    use orefield::{ChunkPos, Direction, Hitbox, Rect, TilePos};

    // -----------------------------------------------------------------------
    // Coordinate conversions
    // -----------------------------------------------------------------------

    #[test]
    fn pixel_tile_chunk_conversions() {
        let tile = TilePos::from_pixel(130, 7);
        assert_eq!(tile, TilePos::new(8, 0));
        assert_eq!(tile.chunk(), ChunkPos::new(1, 0));
        assert_eq!(ChunkPos::from_pixel(130, 7), ChunkPos::new(1, 0));
    }

    #[test]
    fn negative_coordinates_floor() {
        // Arithmetic shifts floor toward negative infinity, so pixel -1 is
        // tile -1, not tile 0.
        assert_eq!(TilePos::from_pixel(-1, -1), TilePos::new(-1, -1));
        assert_eq!(TilePos::new(-1, -1).chunk(), ChunkPos::new(-1, -1));
    }

    #[test]
    fn tile_pixel_round_trip() {
        let tile = TilePos::new(13, 27);
        let (px, py) = tile.pixel();
        assert_eq!(TilePos::from_pixel(px, py), tile);
        assert_eq!(TilePos::from_pixel(px + 15, py + 15), tile);
    }

    #[test]
    fn chunk_origin_tile() {
        assert_eq!(ChunkPos::new(2, 3).origin_tile(), TilePos::new(16, 24));
        assert_eq!(TilePos::new(16, 24).chunk(), ChunkPos::new(2, 3));
        assert_eq!(TilePos::new(23, 31).chunk(), ChunkPos::new(2, 3));
    }

    // -----------------------------------------------------------------------
    // Direction
    // -----------------------------------------------------------------------

    #[test]
    fn direction_opposites_and_signs() {
        assert_eq!(Direction::Up.opposite(), Direction::Down);
        assert_eq!(Direction::Right.opposite(), Direction::Left);
        assert_eq!(Direction::Right.x_sign(), 1);
        assert_eq!(Direction::Left.x_sign(), -1);
        assert_eq!(Direction::Up.y_sign(), 1);
        assert_eq!(Direction::Down.y_sign(), -1);
        assert_eq!(Direction::Up.x_sign(), 0);
    }

    #[test]
    fn direction_index_round_trip() {
        for dir in Direction::ALL {
            assert_eq!(Direction::from_index(dir.index() as i32), dir);
        }
        assert_eq!(Direction::from_index(-1), Direction::Left);
        assert_eq!(Direction::from_index(5), Direction::Right);
    }

    // -----------------------------------------------------------------------
    // Rect intersection
    // -----------------------------------------------------------------------

    #[test]
    fn rects_overlapping_intersect() {
        let a = Rect::new(0, 0, 16, 16);
        let b = Rect::new(8, 8, 16, 16);
        assert!(a.intersects(&b));
        assert!(b.intersects(&a));
    }

    #[test]
    fn rects_sharing_an_edge_do_not_intersect() {
        let a = Rect::new(0, 0, 16, 16);
        let b = Rect::new(16, 0, 16, 16);
        assert!(!a.intersects(&b));
        assert!(!b.intersects(&a));
    }

    #[test]
    fn zero_size_rect_degrades_to_point() {
        let area = Rect::new(0, 0, 16, 16);
        let inside = Rect::new(5, 5, 0, 0);
        let on_far_edge = Rect::new(16, 5, 0, 0);
        assert!(area.intersects(&inside));
        assert!(inside.intersects(&area));
        assert!(!area.intersects(&on_far_edge));
    }

    #[test]
    fn two_points_intersect_only_when_equal() {
        let p = Rect::new(3, 4, 0, 0);
        let q = Rect::new(3, 4, 0, 0);
        let r = Rect::new(3, 5, 0, 0);
        assert!(p.intersects(&q));
        assert!(!p.intersects(&r));
    }

    #[test]
    fn contains_is_inclusive_of_edges() {
        let outer = Rect::new(0, 0, 32, 32);
        assert!(outer.contains(&Rect::new(0, 0, 32, 32)));
        assert!(outer.contains(&Rect::new(8, 8, 16, 16)));
        assert!(!outer.contains(&Rect::new(20, 20, 16, 16)));
    }

    // -----------------------------------------------------------------------
    // Hitbox
    // -----------------------------------------------------------------------

    #[test]
    fn hitbox_anchoring() {
        let rect = Hitbox::STANDARD_UNIT.at(100, 200);
        assert_eq!(rect, Rect::new(103, 200, 16, 16));
    }

    #[test]
    fn none_hitbox_survives_rotation() {
        for steps in 0..4 {
            assert!(Hitbox::NONE.rotated(steps).is_none());
        }
    }

    #[test]
    fn rotation_is_modulo_four() {
        let h = Hitbox::STANDARD_UNIT;
        assert_eq!(h.rotated(0), h);
        assert_eq!(h.rotated(4), h);
        assert_eq!(h.rotated(1), h.rotated(5));
    }

    #[test]
    fn quarter_rotations_of_offset_hitbox() {
        let h = Hitbox::STANDARD_UNIT; // (3, 0, 16, 16)
        assert_eq!(h.rotated(1), Hitbox::new(0, -3, 16, 16));
        assert_eq!(h.rotated(2), Hitbox::new(-3, 0, 16, 16));
        assert_eq!(h.rotated(3), Hitbox::new(3, 0, 16, 16));
    }

    #[test]
    fn square_tile_hitboxes_are_rotation_invariant() {
        for steps in 0..4 {
            assert_eq!(Hitbox::TILE.rotated(steps), Hitbox::TILE);
            assert_eq!(Hitbox::TILE2X2.rotated(steps), Hitbox::TILE2X2);
        }
    }
}
