//! Pieces module - tetromino geometry and clockwise SRS rotation
//!
//! Every rotation state is a constant table of four mino offsets inside a 4x4 bounding
//! box, y growing downward. Kick offsets follow the SRS clockwise tables converted to
//! y-down coordinates.
//! Reference: https://tetris.wiki/SRS

use crate::types::{PieceKind, Rotation};

/// Offset of a single mino relative to piece origin
pub type MinoOffset = (i8, i8);

/// Shape of a piece - 4 mino offsets from piece origin
pub type PieceShape = [MinoOffset; 4];

/// Spawn anchor for new pieces (x, y), inside the hidden buffer
pub const SPAWN_POSITION: (i8, i8) = (4, 0);

/// Shapes indexed by `[kind][rotation]`
const SHAPES: [[PieceShape; 4]; 7] = [
    // I
    [
        [(0, 1), (1, 1), (2, 1), (3, 1)],
        [(2, 0), (2, 1), (2, 2), (2, 3)],
        [(0, 2), (1, 2), (2, 2), (3, 2)],
        [(1, 0), (1, 1), (1, 2), (1, 3)],
    ],
    // O
    [
        [(1, 0), (2, 0), (1, 1), (2, 1)],
        [(1, 0), (2, 0), (1, 1), (2, 1)],
        [(1, 0), (2, 0), (1, 1), (2, 1)],
        [(1, 0), (2, 0), (1, 1), (2, 1)],
    ],
    // T
    [
        [(1, 0), (0, 1), (1, 1), (2, 1)],
        [(1, 0), (1, 1), (2, 1), (1, 2)],
        [(0, 1), (1, 1), (2, 1), (1, 2)],
        [(1, 0), (0, 1), (1, 1), (1, 2)],
    ],
    // S
    [
        [(1, 0), (2, 0), (0, 1), (1, 1)],
        [(1, 0), (1, 1), (2, 1), (2, 2)],
        [(1, 1), (2, 1), (0, 2), (1, 2)],
        [(0, 0), (0, 1), (1, 1), (1, 2)],
    ],
    // Z
    [
        [(0, 0), (1, 0), (1, 1), (2, 1)],
        [(2, 0), (1, 1), (2, 1), (1, 2)],
        [(0, 1), (1, 1), (1, 2), (2, 2)],
        [(1, 0), (0, 1), (1, 1), (0, 2)],
    ],
    // J
    [
        [(0, 0), (0, 1), (1, 1), (2, 1)],
        [(1, 0), (2, 0), (1, 1), (1, 2)],
        [(0, 1), (1, 1), (2, 1), (2, 2)],
        [(1, 0), (1, 1), (0, 2), (1, 2)],
    ],
    // L
    [
        [(2, 0), (0, 1), (1, 1), (2, 1)],
        [(1, 0), (1, 1), (1, 2), (2, 2)],
        [(0, 1), (1, 1), (2, 1), (0, 2)],
        [(0, 0), (1, 0), (1, 1), (1, 2)],
    ],
];

fn kind_index(kind: PieceKind) -> usize {
    match kind {
        PieceKind::I => 0,
        PieceKind::O => 1,
        PieceKind::T => 2,
        PieceKind::S => 3,
        PieceKind::Z => 4,
        PieceKind::J => 5,
        PieceKind::L => 6,
    }
}

/// Get the shape (mino offsets) for a piece kind and rotation
pub fn get_shape(kind: PieceKind, rotation: Rotation) -> PieceShape {
    SHAPES[kind_index(kind)][rotation.index()]
}

/// Clockwise kick offsets indexed by the rotation being left, tried in order
pub type KickTable = [[(i8, i8); 5]; 4];

/// JLSTZ kicks (N->E, E->S, S->W, W->N)
const JLSTZ_KICKS: KickTable = [
    [(0, 0), (-1, 0), (-1, -1), (0, 2), (-1, 2)],
    [(0, 0), (1, 0), (1, 1), (0, -2), (1, -2)],
    [(0, 0), (1, 0), (1, -1), (0, 2), (1, 2)],
    [(0, 0), (-1, 0), (-1, 1), (0, -2), (-1, -2)],
];

/// I kicks (N->E, E->S, S->W, W->N)
const I_KICKS: KickTable = [
    [(0, 0), (-2, 0), (1, 0), (-2, 1), (1, -2)],
    [(0, 0), (-1, 0), (2, 0), (-1, -2), (2, 1)],
    [(0, 0), (2, 0), (-1, 0), (2, -1), (-1, 2)],
    [(0, 0), (1, 0), (-2, 0), (1, 2), (-2, -1)],
];

/// O never needs to move when "rotating"
const O_KICKS: KickTable = [[(0, 0); 5]; 4];

pub fn get_kick_table(kind: PieceKind) -> &'static KickTable {
    match kind {
        PieceKind::O => &O_KICKS,
        PieceKind::I => &I_KICKS,
        _ => &JLSTZ_KICKS,
    }
}

/// Try to rotate a piece clockwise with wall kicks
///
/// Returns `Some((new_rotation, kick_offset))` for the first kick whose cells are all
/// valid, `None` if every kick collides. The result only depends on the arguments and
/// `is_valid`, never on earlier calls.
pub fn try_rotate(
    kind: PieceKind,
    rotation: Rotation,
    x: i8,
    y: i8,
    is_valid: impl Fn(i8, i8) -> bool,
) -> Option<(Rotation, (i8, i8))> {
    let new_rotation = rotation.rotate_cw();
    let new_shape = get_shape(kind, new_rotation);
    let kicks = &get_kick_table(kind)[rotation.index()];

    kicks.iter().copied().find_map(|(dx, dy)| {
        new_shape
            .iter()
            .all(|&(mx, my)| is_valid(x + dx + mx, y + dy + my))
            .then_some((new_rotation, (dx, dy)))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROTATIONS: [Rotation; 4] = [
        Rotation::North,
        Rotation::East,
        Rotation::South,
        Rotation::West,
    ];

    #[test]
    fn every_state_has_four_distinct_minos_inside_the_box() {
        for kind in PieceKind::ALL {
            for rotation in ROTATIONS {
                let shape = get_shape(kind, rotation);
                for (i, a) in shape.iter().enumerate() {
                    assert!((0..4).contains(&a.0) && (0..4).contains(&a.1));
                    assert!(shape[i + 1..].iter().all(|b| a != b), "{kind:?} {rotation:?}");
                }
            }
        }
    }

    #[test]
    fn four_rotations_return_to_spawn_shape() {
        for kind in PieceKind::ALL {
            let mut rotation = Rotation::North;
            for _ in 0..4 {
                rotation = rotation.rotate_cw();
            }
            assert_eq!(get_shape(kind, rotation), get_shape(kind, Rotation::North));
        }
    }

    #[test]
    fn first_kick_is_always_in_place() {
        for kind in PieceKind::ALL {
            assert!(get_kick_table(kind).iter().all(|kicks| kicks[0] == (0, 0)));
        }
    }

    #[test]
    fn rotate_in_open_space_uses_no_kick() {
        let result = try_rotate(PieceKind::T, Rotation::North, 4, 5, |_, _| true);
        assert_eq!(result, Some((Rotation::East, (0, 0))));
    }

    #[test]
    fn rotate_against_left_wall_kicks_right() {
        // I standing vertically in West state at the left wall: its column is x + 1.
        let in_bounds = |x: i8, y: i8| (0..10).contains(&x) && (0..22).contains(&y);
        let result = try_rotate(PieceKind::I, Rotation::West, -1, 5, in_bounds);
        let (rotation, (dx, _)) = result.expect("should kick off the wall");
        assert_eq!(rotation, Rotation::North);
        assert!(dx > 0);
    }

    #[test]
    fn rotate_fully_blocked_gives_up() {
        assert_eq!(
            try_rotate(PieceKind::J, Rotation::North, 4, 5, |_, _| false),
            None
        );
    }
}
