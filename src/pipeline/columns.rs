//! Column splitting: cut a rendered page into reading-order pieces.
//!
//! Whole-page OCR on a two-column hymnal reads straight across the gutter
//! and interleaves the columns. Cutting the page down the middle first and
//! recognising each half alone restores reading order.

use crate::config::ColumnLayout;
use image::DynamicImage;
use std::fmt;

/// Which part of the page an image came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Whole,
    Left,
    Right,
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Column::Whole => "whole page",
            Column::Left => "left column",
            Column::Right => "right column",
        })
    }
}

/// Split `page` per `layout`, left before right.
///
/// The left half is `[0, w/2)`; the right half gets the odd pixel.
pub fn split_columns(page: &DynamicImage, layout: ColumnLayout) -> Vec<(Column, DynamicImage)> {
    match layout {
        ColumnLayout::Single => vec![(Column::Whole, page.clone())],
        ColumnLayout::Dual => {
            let (width, height) = (page.width(), page.height());
            let mid = width / 2;
            vec![
                (Column::Left, page.crop_imm(0, 0, mid, height)),
                (Column::Right, page.crop_imm(mid, 0, width - mid, height)),
            ]
        }
    }
}
