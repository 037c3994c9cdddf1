//! Per-operation metadata.
//!
//! Each dataset method is described by a static [`Operation`] record that the
//! dispatcher in [`BedTool`](crate::BedTool) consults to build the command
//! line. Documentation for the operations lives on the records too.

/// How the input files are passed to the program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Inputs {
    /// One dataset behind the given flag
    Single(&'static str),
    /// `self` behind the first flag, the other dataset behind the second
    Pair(&'static str, &'static str),
    /// Computed in-process; no program is run
    Internal,
}

/// Static description of one dataset operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Operation {
    pub name: &'static str,
    /// Whitelisted program name; empty for internal operations
    pub program: &'static str,
    pub inputs: Inputs,
    /// Needs chromosome sizes passed as `-g`
    pub needs_genome: bool,
    /// False when the result shares `self`'s intervals (e.g. `sequence`)
    pub returns_new_dataset: bool,
    pub summary: &'static str,
}

const fn external(
    name: &'static str,
    program: &'static str,
    inputs: Inputs,
    needs_genome: bool,
    summary: &'static str,
) -> Operation {
    Operation {
        name,
        program,
        inputs,
        needs_genome,
        returns_new_dataset: true,
        summary,
    }
}

pub static OPERATIONS: &[Operation] = &[
    external("intersect", "intersectBed", Inputs::Pair("-a", "-b"), false,
        "Report overlaps between self and other"),
    external("subtract", "subtractBed", Inputs::Pair("-a", "-b"), false,
        "Remove portions of self overlapped by other"),
    external("closest", "closestBed", Inputs::Pair("-a", "-b"), false,
        "Report the nearest feature in other for each feature in self"),
    external("window", "windowBed", Inputs::Pair("-a", "-b"), false,
        "Report features of other within a window around each feature of self"),
    external("coverage", "coverageBed", Inputs::Pair("-a", "-b"), false,
        "Compute coverage of self's features by other"),
    external("merge", "mergeBed", Inputs::Single("-i"), false,
        "Combine overlapping or nearby features"),
    external("sort", "sortBed", Inputs::Single("-i"), false,
        "Sort by chromosome then start"),
    external("cluster", "clusterBed", Inputs::Single("-i"), false,
        "Assign cluster ids to overlapping or nearby features"),
    external("slop", "slopBed", Inputs::Single("-i"), true,
        "Extend features, clipped to chromosome bounds"),
    external("flank", "flankBed", Inputs::Single("-i"), true,
        "Create flanking intervals, clipped to chromosome bounds"),
    external("complement", "complementBed", Inputs::Single("-i"), true,
        "Report genome intervals not covered by self"),
    external("shuffle", "shuffleBed", Inputs::Single("-i"), true,
        "Randomly place features within the genome"),
    Operation {
        name: "sequence",
        program: "fastaFromBed",
        inputs: Inputs::Single("-bed"),
        needs_genome: false,
        returns_new_dataset: false,
        summary: "Extract sequences for self's intervals from a FASTA file",
    },
    Operation {
        name: "random_subset",
        program: "",
        inputs: Inputs::Internal,
        needs_genome: false,
        returns_new_dataset: true,
        summary: "Keep a random sample of n features, in file order",
    },
    Operation {
        name: "feature_centers",
        program: "",
        inputs: Inputs::Internal,
        needs_genome: false,
        returns_new_dataset: true,
        summary: "Replace each feature by a window of the given width at its midpoint",
    },
];

/// Look up an operation by method name.
pub fn lookup(name: &str) -> Option<&'static Operation> {
    OPERATIONS.iter().find(|op| op.name == name)
}
