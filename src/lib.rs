//! `eventarray` is a crate for assembling per-base nanopore measurements into
//! a single, reference-aligned matrix.
//!
//! During sequencing, every read is stored in its own container file. Once the
//! raw signal of a read has been re-segmented and aligned against a reference
//! (a "resquiggle"), its container holds an events table with one entry per
//! called base, along with where on the reference the read starts. This crate
//! gathers one measurement (see [`record::Kind`]) from each aligned read and
//! lays it out in a dense matrix with one row per read and one column per
//! reference position. Positions a read does not cover are left as NaN.
//!
//! ## Building a matrix
//!
//! The main point of entry is [`extract::run()`], which is configured through
//! an [`extract::Config`] and reads containers through anything that
//! implements [`container::Open`]. The run is made of three steps:
//!
//! - [discovering](discovery::Discovery) the containers under an input root
//!   (optionally ordering them by the read number recorded in each),
//! - [sizing](sizing::count_rows()) the matrix by counting the reads that
//!   qualify (see [`record::Criteria`]),
//! - filling a memory-mapped [`Matrix`] row by row, checking each read's
//!   called bases against the [`Reference`] before it is written.
//!
//! Below is a representative example using the in-memory container backend.
//!
//! ```
//! use std::fs::File;
//!
//! use eventarray::Reference;
//! use eventarray::container::Layout;
//! use eventarray::container::memory::Read;
//! use eventarray::container::memory::Store;
//! use eventarray::extract;
//! use eventarray::matrix::View;
//! use eventarray::record::Kind;
//!
//! let root = std::env::temp_dir().join("eventarray-lib-doctest");
//! std::fs::create_dir_all(root.join("reads/0"))?;
//!
//! let path = root.join("reads/0/read.fast5");
//! File::create(&path)?;
//!
//! let mut store = Store::default();
//! store.insert(
//!     &path,
//!     Read::new("rna0", 2, "GTAC", 1)
//!         .dwell([1.0, 2.0, 3.0, 4.0])
//!         .build(&Layout::default()),
//! );
//!
//! let reference = Reference::from_reader(&b">rna0\nACGTACGT\n"[..])?;
//! let config = extract::Config::new("rna0", root.join("reads"), root.join("out.dat"), Kind::Dwell);
//!
//! let summary = extract::run(&config, &reference, &store)?;
//! assert_eq!(summary.rows(), 1);
//!
//! let view = View::open(root.join("out.dat"), reference.len())?;
//! assert_eq!(view.get(0, 2), Some(1.0));
//! assert!(view.get(0, 7).is_some_and(f64::is_nan));
//!
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Containers
//!
//! Container files are HDF5 (`.fast5`) files. Reading them requires the
//! `hdf5` feature, which provides `container::hdf5::Opener`.

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![warn(rust_2021_compatibility)]
#![warn(missing_debug_implementations)]
#![warn(clippy::missing_docs_in_private_items)]
#![warn(rustdoc::broken_intra_doc_links)]

pub mod container;
pub mod core;
pub mod discovery;
pub mod extract;
pub mod matrix;
pub mod record;
pub mod reference;
pub mod sizing;

pub use matrix::Matrix;

pub use self::reference::Reference;
