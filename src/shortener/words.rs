/// Source of candidate short paths. Makes no uniqueness promise.
pub trait CodeGenerator: Send + Sync {
    fn generate(&self) -> String;
}

/// Default number of words in a generated path.
pub const DEFAULT_WORD_COUNT: usize = 3;

const SEPARATOR: char = '-';

const WORDS: &[&str] = &[
    "acorn", "amber", "anchor", "apple", "arrow", "aspen", "badge", "basil", "beach", "berry",
    "birch", "blaze", "bloom", "brook", "cabin", "cactus", "canoe", "cedar", "chalk", "cherry",
    "cider", "cliff", "cloud", "clover", "comet", "coral", "cotton", "crane", "creek", "daisy",
    "delta", "dune", "eagle", "ember", "falcon", "fern", "fjord", "flint", "frost", "garnet",
    "ginger", "glade", "grove", "harbor", "hazel", "heron", "honey", "island", "ivory", "jade",
    "jasper", "juniper", "kayak", "kelp", "lagoon", "lantern", "lemon", "lilac", "linen", "lotus",
    "maple", "marble", "meadow", "mint", "moss", "nectar", "noble", "oasis", "ocean", "olive",
    "onyx", "orbit", "otter", "pebble", "pepper", "pine", "plum", "polar", "poppy", "prairie",
    "quartz", "quill", "raven", "reef", "ridge", "river", "robin", "ruby", "saffron", "sage",
    "sierra", "slate", "spruce", "star", "stone", "summit", "swift", "thistle", "thunder",
    "tiger", "topaz", "tulip", "tundra", "umber", "valley", "velvet", "violet", "walnut",
    "willow", "winter", "wren", "yarrow", "zephyr", "zinc",
];

/// Picks `count` random words from a fixed list and joins them with `-`,
/// e.g. `amber-falcon-river`.
#[derive(Debug, Clone)]
pub struct WordGenerator {
    count: usize,
}

impl WordGenerator {
    /// A zero count is bumped to one; an empty path is never produced.
    pub fn new(count: usize) -> Self {
        WordGenerator {
            count: count.max(1),
        }
    }

    pub fn word_count(&self) -> usize {
        self.count
    }
}

impl Default for WordGenerator {
    fn default() -> Self {
        WordGenerator::new(DEFAULT_WORD_COUNT)
    }
}

impl CodeGenerator for WordGenerator {
    fn generate(&self) -> String {
        let mut out = String::new();
        for i in 0..self.count {
            if i > 0 {
                out.push(SEPARATOR);
            }
            out.push_str(WORDS[rand::random_range(0..WORDS.len())]);
        }
        out
    }
}
