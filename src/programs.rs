//! Whitelist of bedtools programs that may be executed.
//!
//! Every name handed to the [`Invoker`](crate::runner::Invoker) is resolved
//! through this table before anything is spawned. The table maps the legacy
//! standalone executable names to the subcommand of the `bedtools` driver;
//! both spellings are accepted.

/// Legacy program name and the `bedtools` subcommand it maps to.
pub static PROGRAMS: &[(&str, &str)] = &[
    // genome arithmetic
    ("intersectBed", "intersect"),
    ("windowBed", "window"),
    ("closestBed", "closest"),
    ("coverageBed", "coverage"),
    ("mapBed", "map"),
    ("genomeCoverageBed", "genomecov"),
    ("mergeBed", "merge"),
    ("clusterBed", "cluster"),
    ("complementBed", "complement"),
    ("subtractBed", "subtract"),
    ("slopBed", "slop"),
    ("flankBed", "flank"),
    ("sortBed", "sort"),
    ("randomBed", "random"),
    ("shuffleBed", "shuffle"),
    ("annotateBed", "annotate"),
    // multi-way
    ("multiIntersectBed", "multiinter"),
    ("unionBedGraphs", "unionbedg"),
    // paired-end
    ("pairToBed", "pairtobed"),
    ("pairToPair", "pairtopair"),
    // format conversion
    ("bamToBed", "bamtobed"),
    ("bedToBam", "bedtobam"),
    ("bedpeToBam", "bedpetobam"),
    ("bed12ToBed6", "bed12tobed6"),
    ("bamToFastq", "bamtofastq"),
    // fasta
    ("fastaFromBed", "getfasta"),
    ("maskFastaFromBed", "maskfasta"),
    ("nucBed", "nuc"),
    // bam-centric
    ("multiBamCov", "multicov"),
    ("tagBam", "tag"),
    // misc
    ("getOverlap", "overlap"),
    ("bedToIgv", "igv"),
    ("linksBed", "links"),
    ("windowMaker", "makewindows"),
    ("groupBy", "groupby"),
    ("expandCols", "expand"),
];

/// Resolve a program name to its `bedtools` subcommand.
///
/// Returns `None` for anything outside the whitelist. Matching is exact and
/// case-sensitive.
pub fn resolve(name: &str) -> Option<&'static str> {
    PROGRAMS
        .iter()
        .find(|(legacy, subcommand)| *legacy == name || *subcommand == name)
        .map(|(_, subcommand)| *subcommand)
}

/// True if `name` may be executed.
pub fn is_allowed(name: &str) -> bool {
    resolve(name).is_some()
}
