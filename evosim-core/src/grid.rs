use evosim_types::Heading;

/// 45 degrees counter-clockwise.
pub(crate) fn rotate_left(heading: Heading) -> Heading {
    match heading {
        Heading::East => Heading::NorthEast,
        Heading::NorthEast => Heading::North,
        Heading::North => Heading::NorthWest,
        Heading::NorthWest => Heading::West,
        Heading::West => Heading::SouthWest,
        Heading::SouthWest => Heading::South,
        Heading::South => Heading::SouthEast,
        Heading::SouthEast => Heading::East,
    }
}

/// 45 degrees clockwise.
pub(crate) fn rotate_right(heading: Heading) -> Heading {
    match heading {
        Heading::East => Heading::SouthEast,
        Heading::SouthEast => Heading::South,
        Heading::South => Heading::SouthWest,
        Heading::SouthWest => Heading::West,
        Heading::West => Heading::NorthWest,
        Heading::NorthWest => Heading::North,
        Heading::North => Heading::NorthEast,
        Heading::NorthEast => Heading::East,
    }
}

pub(crate) fn opposite(heading: Heading) -> Heading {
    match heading {
        Heading::East => Heading::West,
        Heading::NorthEast => Heading::SouthWest,
        Heading::North => Heading::South,
        Heading::NorthWest => Heading::SouthEast,
        Heading::West => Heading::East,
        Heading::SouthWest => Heading::NorthEast,
        Heading::South => Heading::North,
        Heading::SouthEast => Heading::NorthWest,
    }
}

/// Heading for a step whose components are reduced to their signs. `None`
/// for a zero step.
pub(crate) fn heading_from_delta(dx: i32, dy: i32) -> Option<Heading> {
    let step = (dx.signum(), dy.signum());
    Heading::ALL
        .into_iter()
        .find(|heading| heading.offset() == step)
}

pub(crate) fn neighbor(position: (i32, i32), heading: Heading) -> (i32, i32) {
    let (x, y) = position;
    let (dx, dy) = heading.offset();
    (x + dx, y + dy)
}
