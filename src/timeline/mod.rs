//! Timeline model: members, tracks, the track controller and projects.

pub mod controller;
pub mod member;
pub mod project;
pub mod track;
