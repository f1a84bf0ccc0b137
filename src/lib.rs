//! tabular-view - an interactive data table for the terminal
//!
//! [`model::TabularView`] is the table engine: it holds rows and column
//! descriptors and derives the visible row order from the active filters
//! and sort. Selection, expansion and the current row are tracked by row
//! identity, and every change is reported to subscribed listeners. The
//! engine's [`model::PresentationTree`] is drawn by the ratatui front end in
//! [`components`].

pub mod action;
pub mod app;
pub mod component;
pub mod components;
pub mod config;
pub mod model;
pub mod services;
pub mod tui;
