pub use self::{board::*, cell::*, piece::*, render::*};

pub(crate) mod board;
pub(crate) mod cell;
pub(crate) mod piece;
pub(crate) mod render;
