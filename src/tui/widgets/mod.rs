pub mod entries;
pub mod entry_view;
pub mod form;
pub mod header;
pub mod rating;
pub mod statusbar;
