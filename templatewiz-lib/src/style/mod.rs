pub mod color_filter;
pub mod owned_css;
pub mod reducer;
