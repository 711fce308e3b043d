pub mod markup;
pub mod scroll;
