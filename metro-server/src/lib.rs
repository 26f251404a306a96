//! Metro route query server.
//!
//! A web application that answers: "leaving at this time, how do I get
//! from one station to another, and what does it cost?"

pub mod domain;
pub mod graph;
pub mod network;
pub mod planner;
pub mod schedule;
pub mod service;
pub mod web;
