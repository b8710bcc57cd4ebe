//! Affichage des rapports

pub mod report;
