//! Command-line interface for Vigil.
//!
//! This module provides a structured CLI using clap for argument parsing.

mod commands;

use clap::{Parser, Subcommand};

/// Vigil - Workplace incident reporting service
#[derive(Parser)]
#[command(name = "vigil")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the web service
    #[command(alias = "-s")]
    Serve,

    /// Create default config file
    #[command(alias = "--init")]
    Init,

    /// Create an administrator account and print its temporary password
    CreateAdmin {
        /// Login handle
        handle: String,

        /// Contact address used for credential recovery
        #[arg(long)]
        contact: Option<String>,

        /// Role: primary_admin or incident_manager
        #[arg(long, default_value = "primary_admin")]
        role: String,
    },

    /// List administrator accounts
    #[command(alias = "ls")]
    ListAdmins,
}

pub use commands::*;
