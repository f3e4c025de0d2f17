//! Command line arguments and parameters management/parsing.
//!
//! Every parameter is validated when converting the parsed arguments into a pipeline,
//! so that invalid configurations are rejected before anything is written.
use std::convert::TryFrom;
use std::path::PathBuf;
use std::time::Duration;

use structopt::StructOpt;

use basecorp::classify::annif::DEFAULT_URL;
use basecorp::classify::ClassifyEval;
use basecorp::corpus::{self, Ratios, Selection};
use basecorp::error::Error;
use basecorp::lang::Lang;
use basecorp::reduce::{self, dump::SequenceRange};
use basecorp::stats;

#[derive(Debug, StructOpt)]
#[structopt(
    name = "basecorp",
    about = "BASE dump reduction and DDC corpus preparation tool."
)]
/// Holds every command that is callable by the `basecorp` command.
pub enum Basecorp {
    #[structopt(about = "Reduce the records of a BASE dump")]
    Reduce(Reduce),
    #[structopt(about = "Prepare eval/test/train corpora from raw corpora")]
    Prepare(Prepare),
    #[structopt(about = "Classify an eval corpus with Annif")]
    Classify(Classify),
    #[structopt(about = "Summarize statistics files")]
    Summarize(Summarize),
}

#[derive(Debug, StructOpt)]
/// Reduce command and parameters.
///
/// ```sh
/// USAGE:
///     basecorp reduce [FLAGS] [OPTIONS] <src> <dst>
///
/// FLAGS:
///     -o, --overwrite    Overwrite existing result files
///
/// OPTIONS:
///     -e, --end <end>                ListRecords end number
///     -p, --processes <processes>    Max number of concurrent workers [default: 8]
///     -s, --start <start>            ListRecords start number [default: 0]
/// ```
pub struct Reduce {
    #[structopt(parse(from_os_str), help = "BASE dump location (ListRecords files)")]
    pub src: PathBuf,
    #[structopt(parse(from_os_str), help = "reduced records destination")]
    pub dst: PathBuf,
    #[structopt(
        short = "p",
        long = "processes",
        default_value = "8",
        help = "Max number of concurrent workers"
    )]
    pub processes: usize,
    #[structopt(
        short = "s",
        long = "start",
        default_value = "0",
        help = "ListRecords start number"
    )]
    pub start: u64,
    #[structopt(short = "e", long = "end", help = "ListRecords end number")]
    pub end: Option<u64>,
    #[structopt(short = "o", long = "overwrite", help = "Overwrite existing result files")]
    pub overwrite: bool,
    #[structopt(
        long = "poll-ms",
        default_value = "100",
        help = "Interval between worker completion checks, in milliseconds"
    )]
    pub poll_ms: u64,
}

impl TryFrom<Reduce> for reduce::Reduce {
    type Error = Error;

    fn try_from(r: Reduce) -> Result<Self, Self::Error> {
        if r.processes == 0 {
            return Err(Error::Config(
                "number of processes must be at least 1".to_string(),
            ));
        }
        if let Some(end) = r.end {
            if end < r.start {
                return Err(Error::Config(format!(
                    "end index {} is lower than start index {}",
                    end, r.start
                )));
            }
        }
        Ok(reduce::Reduce::new(
            r.src,
            r.dst,
            r.processes,
            SequenceRange::new(r.start, r.end),
            r.overwrite,
            Duration::from_millis(r.poll_ms),
        ))
    }
}

#[derive(Debug, StructOpt)]
/// Prepare command and parameters.
pub struct Prepare {
    #[structopt(
        parse(from_os_str),
        help = "raw corpus location (contains de/ and en/)"
    )]
    pub raw: PathBuf,
    #[structopt(parse(from_os_str), help = "prepared corpora destination")]
    pub dst: PathBuf,
    #[structopt(
        short = "t",
        long = "test-ratio",
        default_value = "0.1",
        help = "Ratio of the documents which go into the test corpus"
    )]
    pub test_ratio: f64,
    #[structopt(
        short = "e",
        long = "eval-ratio",
        default_value = "0.1",
        help = "Ratio of the documents which go into the evaluation corpus. Note that the final size may be lower than this if there are not enough documents classified by baseclf"
    )]
    pub eval_ratio: f64,
    #[structopt(
        short = "c",
        long = "clear",
        help = "Delete an existing corpus before preparation"
    )]
    pub clear: bool,
    #[structopt(
        short = "n",
        long = "non-random",
        help = "Do not create a random evaluation corpus, use only documents classified by baseclf instead"
    )]
    pub non_random: bool,
    #[structopt(short = "D", long = "german", help = "Prepare the german corpora")]
    pub german: bool,
    #[structopt(short = "E", long = "english", help = "Prepare the english corpora")]
    pub english: bool,
}

impl TryFrom<Prepare> for corpus::Prepare {
    type Error = Error;

    fn try_from(p: Prepare) -> Result<Self, Self::Error> {
        let ratios = Ratios::new(p.eval_ratio, p.test_ratio)?;

        let mut langs = Vec::new();
        if p.german {
            langs.push(Lang::De);
        }
        if p.english {
            langs.push(Lang::En);
        }
        if langs.is_empty() {
            return Err(Error::Config(
                "either a German (-D) or English (-E) corpus must be created (or both)".to_string(),
            ));
        }

        let selection = if p.non_random {
            Selection::NonRandom
        } else {
            Selection::Random
        };

        Ok(corpus::Prepare::new(
            p.raw, p.dst, langs, ratios, selection, p.clear,
        ))
    }
}

#[derive(Debug, StructOpt)]
/// Classify command and parameters.
pub struct Classify {
    #[structopt(parse(from_os_str), help = "prepared corpora location")]
    pub prepared: PathBuf,
    #[structopt(
        help = "The annif backend to use. Its language should correspond to the language of the evaluation corpus (e.g. 'de-omikuji' with '-c de')"
    )]
    pub backend: String,
    #[structopt(parse(from_os_str), help = "DDC vocabulary (code<TAB>label)")]
    pub vocab: PathBuf,
    #[structopt(
        short = "c",
        long = "corpus-language",
        possible_values = &["de", "en"],
        help = "Language of the evaluation corpus"
    )]
    pub corpus_language: String,
    #[structopt(
        short = "l",
        long = "limit",
        default_value = "2",
        help = "Upper limit of suggested classes"
    )]
    pub limit: usize,
    #[structopt(
        short = "t",
        long = "threshold",
        default_value = "0.5",
        help = "Lower limit of the confidence score required to suggest a class"
    )]
    pub threshold: f64,
    #[structopt(
        short = "p",
        long = "percentage",
        default_value = "1.0",
        help = "Share of the corpus to classify"
    )]
    pub percentage: f64,
    #[structopt(long = "url", default_value = DEFAULT_URL, help = "Annif location")]
    pub url: String,
}

impl TryFrom<Classify> for ClassifyEval {
    type Error = Error;

    fn try_from(c: Classify) -> Result<Self, Self::Error> {
        let lang: Lang = c.corpus_language.parse()?;
        if !(0.0..=1.0).contains(&c.percentage) {
            return Err(Error::Config(
                "percentage must be a float from 0.0 to 1.0".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&c.threshold) {
            return Err(Error::Config(
                "threshold must be a float from 0.0 to 1.0".to_string(),
            ));
        }
        Ok(ClassifyEval::new(
            c.prepared,
            lang,
            c.backend,
            c.vocab,
            c.limit,
            c.threshold,
            c.percentage,
            c.url,
        ))
    }
}

#[derive(Debug, StructOpt)]
/// Summarize command and parameters.
pub struct Summarize {
    #[structopt(parse(from_os_str), help = "statistics files location")]
    pub src: PathBuf,
    #[structopt(parse(from_os_str), help = "summary destination")]
    pub dst: PathBuf,
}

impl From<Summarize> for stats::Summarize {
    fn from(s: Summarize) -> Self {
        stats::Summarize::new(s.src, s.dst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prepare(args: &[&str]) -> Result<corpus::Prepare, Error> {
        let opt = Basecorp::from_iter_safe(args).unwrap();
        match opt {
            Basecorp::Prepare(p) => corpus::Prepare::try_from(p),
            _ => panic!("not a prepare command"),
        }
    }

    #[test]
    fn prepare_needs_a_language() {
        assert!(prepare(&["basecorp", "prepare", "raw", "dst"]).is_err());
        assert!(prepare(&["basecorp", "prepare", "raw", "dst", "-D"]).is_ok());
    }

    #[test]
    fn prepare_ratios() {
        assert!(prepare(&["basecorp", "prepare", "raw", "dst", "-E", "-e", "0.6", "-t", "0.5"]).is_err());
        assert!(prepare(&["basecorp", "prepare", "raw", "dst", "-E", "-t", "1.5"]).is_err());
        assert!(prepare(&["basecorp", "prepare", "raw", "dst", "-E", "-e", "0.5", "-t", "0.5"]).is_ok());
    }

    #[test]
    fn reduce_defaults() {
        let opt = Basecorp::from_iter_safe(&["basecorp", "reduce", "dump", "out"]).unwrap();
        match opt {
            Basecorp::Reduce(r) => {
                assert_eq!(r.processes, 8);
                assert_eq!(r.start, 0);
                assert_eq!(r.end, None);
                assert!(!r.overwrite);
                assert!(reduce::Reduce::try_from(r).is_ok());
            }
            _ => panic!("not a reduce command"),
        }
    }

    #[test]
    fn reduce_rejects_zero_processes() {
        let opt = Basecorp::from_iter_safe(&["basecorp", "reduce", "dump", "out", "-p", "0"]).unwrap();
        match opt {
            Basecorp::Reduce(r) => assert!(reduce::Reduce::try_from(r).is_err()),
            _ => panic!("not a reduce command"),
        }
    }

    #[test]
    fn classify_percentage() {
        let opt = Basecorp::from_iter_safe(&[
            "basecorp", "classify", "prep", "en-omikuji", "en_ddc.tsv", "-c", "en", "-p", "1.5",
        ])
        .unwrap();
        match opt {
            Basecorp::Classify(c) => assert!(ClassifyEval::try_from(c).is_err()),
            _ => panic!("not a classify command"),
        }
    }
}
