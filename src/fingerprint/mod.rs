pub mod builder;
pub mod compare;
pub mod decode;
pub mod stream;

pub use builder::{
    BuildOutput, FingerprintBuilder, FingerprintSummary, Progress, build_fingerprint,
    build_fingerprint_with_progress,
};
pub use compare::{
    ComparisonResult, FingerprintComparator, compare_artifacts, compare_fingerprints,
    write_pair_dump,
};
pub use decode::{DecimatingReader, PCM8_TABLE};
pub use stream::{FingerprintStream, FingerprintWriter, fingerprint_path, quantize};
