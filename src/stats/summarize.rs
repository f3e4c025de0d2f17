/*! Statistics file aggregation

Merges every statistics file (`*.json`) of a folder into one [Node] and derives CSV reports from it.

| file | columns | source |
|---|---|---|
| `summarized_stats.json` | | the merged tree |
| `corpus_stats.csv` | lang, ddc_class, desc_length | `corpus.<lang>.classcodes.<codes>` |
| `corpus_single_class_stats.csv` | lang, ddc_class, count | same, multi-class keys split on `:` |
| `<category>_stats.csv` | category, count | `ddc_data.<category>.codes` |
| `<category>_single_class_stats.csv` | category, count | same, split on `:` |
| `language_stats.csv` | min_length, detection, lang, count | `languages.<min_length>.<detection>` |
| `processing_stats.csv` | processing_result, count | `processing_stats` |
| `description_num_per_record_stats.csv` | num_per_record, count | `descriptions.num_descs_per_record` |
| `description_length_stats.csv` | length_bin, length_bin_center, count | `descriptions.combined_desc_lengths` |

Missing sections yield header-only reports.
!*/
use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use log::{error, info, warn};
use rayon::prelude::*;
use serde_json::Value;

use super::accumulator::Node;
use crate::error::Error;
use crate::pipeline::Pipeline;

pub const SUMMARY_FILE: &str = "summarized_stats.json";

const MIN_LENGTHS: [&str; 2] = ["desc_min_length", "not_desc_min_length"];
const DETECTIONS: [&str; 2] = ["all", "reliable"];

/// Processing events, in pipeline order.
const EVENTS: [&str; 7] = [
    "min_length",
    "no_classcodes",
    "lang_detection_failure",
    "lang_detection_unreliable",
    "lang_min_confidence",
    "other_lang",
    "eligible",
];

/// Iterate over the children of the branch at `path`, if there is one.
fn children<'a>(root: &'a Node, path: &[&str]) -> impl Iterator<Item = (&'a String, &'a Node)> {
    root.get(path).and_then(Node::as_branch).into_iter().flatten()
}

fn value_cell(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        v => v.to_string(),
    }
}

/// Sum counts of colon-separated multi-class keys per single class.
fn single_class_counts<'a, I>(counts: I) -> Result<HashMap<String, Node>, Error>
where
    I: Iterator<Item = (&'a String, Node)>,
{
    let mut collected: HashMap<String, Node> = HashMap::new();
    for (classes, count) in counts {
        for class in classes.split(':') {
            collected
                .entry(class.to_string())
                .or_insert(Node::Int(0))
                .merge(count.clone())?;
        }
    }
    Ok(collected)
}

/// Center of a `"a-b"` length bin, `0` for the `"0"` bin.
fn bin_center(bin: &str) -> Result<String, Error> {
    if bin == "0" {
        return Ok("0".to_string());
    }
    let invalid = || Error::Custom(format!("invalid description length bin '{}'", bin));
    let (low, high) = bin.split_once('-').ok_or_else(invalid)?;
    let low: f64 = low.trim().parse().map_err(|_| invalid())?;
    let high: f64 = high.trim().parse().map_err(|_| invalid())?;
    Ok(format!("{:?}", (low + high) / 2.0))
}

fn writer(dst: &Path, name: &str) -> Result<csv::Writer<File>, Error> {
    Ok(csv::WriterBuilder::new().from_path(dst.join(name))?)
}

/// Load and merge every statistics file of `src`, in file name order.
pub fn load(src: &Path) -> Result<Node, Error> {
    let src_str = src
        .to_str()
        .ok_or_else(|| Error::Custom(format!("invalid statistics folder: {:?}", src)))?;
    let pattern = format!("{}/*.json", glob::Pattern::escape(src_str));
    let mut paths = glob::glob(&pattern)?.collect::<Result<Vec<PathBuf>, _>>()?;
    paths.sort();
    info!("merging {} statistics files", paths.len());

    let nodes = paths
        .par_iter()
        .map(|path| -> Result<Node, Error> {
            let f = BufReader::new(File::open(path)?);
            serde_json::from_reader(f).map_err(|e| {
                error!("{:?}: {}", path, e);
                Error::Serde(e)
            })
        })
        .collect::<Result<Vec<Node>, Error>>()?;

    let mut summary = Node::default();
    for (path, node) in paths.iter().zip(nodes) {
        summary.merge(node).map_err(|e| {
            error!("{:?}: {}", path, e);
            e
        })?;
    }
    Ok(summary)
}

pub fn write_summary(summary: &Node, dst: &Path) -> Result<(), Error> {
    let mut f = BufWriter::new(File::create(dst.join(SUMMARY_FILE))?);
    serde_json::to_writer_pretty(&mut f, summary)?;
    f.flush()?;
    Ok(())
}

pub fn corpus_stats(summary: &Node, dst: &Path) -> Result<(), Error> {
    let mut out = writer(dst, "corpus_stats.csv")?;
    out.write_record(["lang", "ddc_class", "desc_length"])?;
    let mut single = writer(dst, "corpus_single_class_stats.csv")?;
    single.write_record(["lang", "ddc_class", "count"])?;

    for (lang, lang_node) in children(summary, &["corpus"]) {
        let mut counts = Vec::new();
        for (classcodes, lengths) in children(lang_node, &["classcodes"]) {
            match lengths.as_sequence() {
                Some(lengths) => {
                    for length in lengths {
                        out.write_record([
                            lang.as_str(),
                            classcodes.as_str(),
                            value_cell(length).as_str(),
                        ])?;
                    }
                    counts.push((classcodes, Node::Int(lengths.len() as i64)));
                }
                None => warn!("corpus.{}.classcodes.{} is not a sequence", lang, classcodes),
            }
        }

        let collected = single_class_counts(counts.into_iter())?;
        let collected: BTreeMap<_, _> = collected.into_iter().collect();
        for (class, count) in collected {
            single.write_record([lang.as_str(), class.as_str(), count.to_string().as_str()])?;
        }
    }
    out.flush()?;
    single.flush()?;
    Ok(())
}

pub fn classcode_stats(summary: &Node, dst: &Path) -> Result<(), Error> {
    for (category, category_node) in children(summary, &["ddc_data"]) {
        let mut out = writer(dst, &format!("{}_stats.csv", category))?;
        out.write_record([category.as_str(), "count"])?;
        for (code, count) in children(category_node, &["codes"]) {
            out.write_record([code.as_str(), count.to_string().as_str()])?;
        }
        out.flush()?;

        let collected = single_class_counts(
            children(category_node, &["codes"]).map(|(code, count)| (code, count.clone())),
        )?;
        let collected: BTreeMap<_, _> = collected.into_iter().collect();
        let mut single = writer(dst, &format!("{}_single_class_stats.csv", category))?;
        single.write_record([category.as_str(), "count"])?;
        for (class, count) in collected {
            single.write_record([class, count.to_string()])?;
        }
        single.flush()?;
    }
    Ok(())
}

pub fn language_stats(summary: &Node, dst: &Path) -> Result<(), Error> {
    let mut out = writer(dst, "language_stats.csv")?;
    out.write_record(["min_length", "detection", "lang", "count"])?;
    for min_length in MIN_LENGTHS {
        for detection in DETECTIONS {
            for (lang, count) in children(summary, &["languages", min_length, detection]) {
                out.write_record([
                    min_length,
                    detection,
                    lang.as_str(),
                    count.to_string().as_str(),
                ])?;
            }
        }
    }
    out.flush()?;
    Ok(())
}

pub fn processing_stats(summary: &Node, dst: &Path) -> Result<(), Error> {
    let mut out = writer(dst, "processing_stats.csv")?;
    out.write_record(["processing_result", "count"])?;
    for event in EVENTS {
        let count = summary
            .get(&["processing_stats", event])
            .map_or_else(|| "0".to_string(), |c| c.to_string());
        out.write_record([event, count.as_str()])?;
    }
    out.flush()?;
    Ok(())
}

pub fn description_stats(summary: &Node, dst: &Path) -> Result<(), Error> {
    let mut out = writer(dst, "description_num_per_record_stats.csv")?;
    out.write_record(["num_per_record", "count"])?;
    for (num, count) in children(summary, &["descriptions", "num_descs_per_record"]) {
        out.write_record([num.as_str(), count.to_string().as_str()])?;
    }
    out.flush()?;

    let mut out = writer(dst, "description_length_stats.csv")?;
    out.write_record(["length_bin", "length_bin_center", "count"])?;
    for (bin, count) in children(summary, &["descriptions", "combined_desc_lengths"]) {
        out.write_record([bin.as_str(), bin_center(bin)?.as_str(), count.to_string().as_str()])?;
    }
    out.flush()?;
    Ok(())
}

pub struct Summarize {
    src: PathBuf,
    dst: PathBuf,
}

impl Summarize {
    pub fn new(src: PathBuf, dst: PathBuf) -> Self {
        Self { src, dst }
    }
}

impl Pipeline<Node> for Summarize {
    fn run(&self) -> Result<Node, Error> {
        let summary = load(&self.src)?;

        if !self.dst.exists() {
            warn!("Destination folder does not exist. Creating");
            std::fs::create_dir_all(&self.dst)?;
        }

        write_summary(&summary, &self.dst)?;
        corpus_stats(&summary, &self.dst)?;
        description_stats(&summary, &self.dst)?;
        classcode_stats(&summary, &self.dst)?;
        language_stats(&summary, &self.dst)?;
        processing_stats(&summary, &self.dst)?;
        info!("summary written to {:?}", self.dst);

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use tempfile::tempdir;

    use super::*;

    fn read(dir: &Path, name: &str) -> String {
        std::fs::read_to_string(dir.join(name)).unwrap()
    }

    #[test]
    fn bins() {
        assert_eq!(bin_center("0").unwrap(), "0");
        assert_eq!(bin_center("1-100").unwrap(), "50.5");
        assert_eq!(bin_center("0-10").unwrap(), "5.0");
        assert!(bin_center("abc").is_err());
    }

    #[test]
    fn single_classes() {
        let a = "004:510".to_string();
        let b = "510".to_string();
        let counts = vec![(&a, Node::Int(2)), (&b, Node::Int(3))];
        let collected = single_class_counts(counts.into_iter()).unwrap();
        assert_eq!(collected["004"], Node::Int(2));
        assert_eq!(collected["510"], Node::Int(5));
    }

    #[test]
    fn reports() {
        let summary: Node = serde_json::from_value(json!({
            "corpus": {"en": {"classcodes": {"004:510": [12, 30], "510": [7]}}},
            "ddc_data": {"classcode": {"codes": {"004:510": 2, "510": 1}}},
            "languages": {"desc_min_length": {"all": {"en": 3}, "reliable": {"en": 2}}},
            "processing_stats": {"eligible": 3, "min_length": 1},
            "descriptions": {
                "num_descs_per_record": {"1": 4},
                "combined_desc_lengths": {"0": 1, "1-100": 3}
            }
        }))
        .unwrap();
        let dst = tempdir().unwrap();
        let d = dst.path();
        corpus_stats(&summary, d).unwrap();
        classcode_stats(&summary, d).unwrap();
        language_stats(&summary, d).unwrap();
        processing_stats(&summary, d).unwrap();
        description_stats(&summary, d).unwrap();

        assert_eq!(
            read(d, "corpus_stats.csv"),
            "lang,ddc_class,desc_length\nen,004:510,12\nen,004:510,30\nen,510,7\n"
        );
        assert_eq!(
            read(d, "corpus_single_class_stats.csv"),
            "lang,ddc_class,count\nen,004,2\nen,510,3\n"
        );
        assert_eq!(
            read(d, "classcode_stats.csv"),
            "classcode,count\n004:510,2\n510,1\n"
        );
        assert_eq!(
            read(d, "classcode_single_class_stats.csv"),
            "classcode,count\n004,2\n510,3\n"
        );
        assert_eq!(
            read(d, "language_stats.csv"),
            "min_length,detection,lang,count\ndesc_min_length,all,en,3\ndesc_min_length,reliable,en,2\n"
        );
        assert_eq!(
            read(d, "processing_stats.csv"),
            "processing_result,count\nmin_length,1\nno_classcodes,0\nlang_detection_failure,0\n\
             lang_detection_unreliable,0\nlang_min_confidence,0\nother_lang,0\neligible,3\n"
        );
        assert_eq!(
            read(d, "description_length_stats.csv"),
            "length_bin,length_bin_center,count\n0,0,1\n1-100,50.5,3\n"
        );
        assert_eq!(
            read(d, "description_num_per_record_stats.csv"),
            "num_per_record,count\n1,4\n"
        );
    }

    #[test]
    fn float_counts() {
        let summary: Node = serde_json::from_value(json!({
            "processing_stats": {"eligible": 2.0, "min_length": 1}
        }))
        .unwrap();
        let dst = tempdir().unwrap();
        processing_stats(&summary, dst.path()).unwrap();
        let report = read(dst.path(), "processing_stats.csv");
        assert!(report.contains("min_length,1\n"));
        assert!(report.ends_with("eligible,2.0\n"));
    }

    #[test]
    fn empty_summary() {
        let dst = tempdir().unwrap();
        corpus_stats(&Node::default(), dst.path()).unwrap();
        assert_eq!(
            read(dst.path(), "corpus_stats.csv"),
            "lang,ddc_class,desc_length\n"
        );
    }
}
