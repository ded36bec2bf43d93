pub mod analog;
pub mod button;
pub mod led_matrix;
pub mod registers;
pub mod serial;
pub mod time;
