//! Cycle hire route planner server.
//!
//! A web application that answers: "Which way should I ride between these
//! two docking stations, given how much I care about distance, safety and
//! comfort?"

pub mod config;
pub mod domain;
pub mod network;
pub mod planner;
pub mod stations;
pub mod web;
