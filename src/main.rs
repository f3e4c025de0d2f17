//! # basecorp
//!
//! BASE dump reduction and Annif corpus preparation.
//!
//! ## Getting started
//!
//! ```sh
//! basecorp 0.3.0
//! BASE dump reduction and DDC corpus preparation tool.
//!
//! USAGE:
//!     basecorp <SUBCOMMAND>
//!
//! FLAGS:
//!     -h, --help       Prints help information
//!     -V, --version    Prints version information
//!
//! SUBCOMMANDS:
//!     classify     Classify an eval corpus with Annif
//!     help         Prints this message or the help of the given subcommand(s)
//!     prepare      Prepare eval/test/train corpora from raw corpora
//!     reduce       Reduce the records of a BASE dump
//!     summarize    Summarize statistics files
//! ```
//!
use std::convert::TryFrom;

use structopt::StructOpt;

use basecorp::classify::ClassifyEval;
use basecorp::error::Error;
use basecorp::pipeline::Pipeline;
use basecorp::{corpus, reduce, stats};

#[macro_use]
extern crate log;

mod cli;

fn main() -> Result<(), Error> {
    env_logger::init();

    let opt = cli::Basecorp::from_args();
    debug!("cli args\n{:#?}", opt);

    run(opt).map_err(|e| {
        error!("{}", e);
        e
    })
}

fn run(opt: cli::Basecorp) -> Result<(), Error> {
    match opt {
        cli::Basecorp::Reduce(r) => {
            let p = reduce::Reduce::try_from(r)?;
            p.run()?;
        }

        cli::Basecorp::Prepare(p) => {
            let p = corpus::Prepare::try_from(p)?;
            p.run()?;
        }

        cli::Basecorp::Classify(c) => {
            let p = ClassifyEval::try_from(c)?;
            p.run()?;
        }

        cli::Basecorp::Summarize(s) => {
            let p = stats::Summarize::from(s);
            p.run()?;
        }
    };

    Ok(())
}
