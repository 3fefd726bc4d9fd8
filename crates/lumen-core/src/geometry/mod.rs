pub mod flips;

pub use flips::{hflip, rot180, vflip, Hflip, Rot180, Vflip};
