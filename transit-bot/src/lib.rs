//! Madrid transit chat bot.
//!
//! Answers "when is the next one?" for metro, commuter rail, urban and
//! interurban buses, and bike-share docks, through menus, typed searches
//! and inline mode. Stop catalogs are loaded from provider feeds and
//! refreshed daily; live times are fetched on every render.

pub mod bot;
pub mod catalog;
pub mod config;
pub mod domain;
pub mod feedback;
pub mod live;
pub mod menu;
pub mod pending;
pub mod resolve;
pub mod store;
pub mod templates;
pub mod token;
pub mod web;
