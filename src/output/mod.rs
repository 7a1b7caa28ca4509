pub mod formatter;

pub use formatter::{format_exam_list, format_exam_table, format_mark, should_use_colors};
