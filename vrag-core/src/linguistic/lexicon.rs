//! Word lists backing the rule-based tagger.

use std::collections::HashSet;
use std::sync::LazyLock;

fn set(words: &'static [&'static str]) -> HashSet<&'static str> {
    words.iter().copied().collect()
}

pub(crate) static STOP_WORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    set(&[
        "a", "about", "above", "across", "after", "afterwards", "again", "against", "all",
        "almost", "alone", "along", "already", "also", "although", "always", "am", "among",
        "amongst", "an", "and", "another", "any", "anyhow", "anyone", "anything", "anyway",
        "anywhere", "are", "around", "as", "at", "back", "be", "became", "because", "become",
        "becomes", "becoming", "been", "before", "beforehand", "behind", "being", "below",
        "beside", "besides", "between", "beyond", "both", "bottom", "but", "by", "call", "can",
        "cannot", "could", "did", "do", "does", "doing", "done", "down", "due", "during", "each",
        "either", "else", "elsewhere", "empty", "enough", "even", "ever", "every", "everyone",
        "everything", "everywhere", "except", "few", "first", "for", "former", "formerly",
        "from", "front", "full", "further", "get", "give", "go", "had", "has", "have", "he",
        "hence", "her", "here", "hereafter", "hereby", "herein", "hers", "herself", "him",
        "himself", "his", "how", "however", "i", "if", "in", "indeed", "into", "is", "it", "its",
        "itself", "just", "keep", "last", "latter", "least", "less", "made", "make", "many",
        "may", "me", "meanwhile", "might", "mine", "more", "moreover", "most", "mostly", "move",
        "much", "must", "my", "myself", "name", "namely", "neither", "never", "nevertheless",
        "next", "no", "nobody", "none", "nor", "not", "nothing", "now", "nowhere", "of", "off",
        "often", "on", "once", "one", "only", "onto", "or", "other", "others", "otherwise",
        "our", "ours", "ourselves", "out", "over", "own", "part", "per", "perhaps", "please",
        "put", "quite", "rather", "really", "regarding", "same", "say", "see", "seem", "seemed",
        "seeming", "seems", "several", "she", "should", "show", "side", "since", "so", "some",
        "somehow", "someone", "something", "sometime", "sometimes", "somewhere", "still",
        "such", "take", "than", "that", "the", "their", "them", "themselves", "then", "thence",
        "there", "thereafter", "thereby", "therefore", "therein", "these", "they", "this",
        "those", "though", "through", "throughout", "thru", "thus", "to", "together", "too",
        "top", "toward", "towards", "under", "unless", "until", "up", "upon", "us", "used",
        "using", "various", "very", "via", "was", "we", "well", "were", "what", "whatever",
        "when", "whence", "whenever", "where", "whereas", "whereby", "wherever", "whether",
        "which", "while", "who", "whoever", "whole", "whom", "whose", "why", "will", "with",
        "within", "without", "would", "yet", "you", "your", "yours", "yourself", "yourselves",
    ])
});

pub(crate) static DETERMINERS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    set(&[
        "a", "an", "the", "this", "that", "these", "those", "each", "every", "some", "any", "no",
        "another", "either", "neither", "all", "both", "such", "my", "your", "his", "her", "its",
        "our", "their",
    ])
});

pub(crate) static PRONOUNS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    set(&[
        "i", "you", "he", "she", "it", "we", "they", "me", "him", "us", "them", "myself",
        "yourself", "himself", "herself", "itself", "ourselves", "themselves", "mine", "yours",
        "hers", "ours", "theirs", "what", "who", "whom", "whose", "which", "whoever",
        "whatever", "someone", "something", "anyone", "anything", "everyone", "everything",
        "nobody", "nothing",
    ])
});

/// Pronouns that stand as a noun phrase on their own.
pub(crate) static PERSONAL_PRONOUNS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    set(&["i", "you", "he", "she", "it", "we", "they", "me", "him", "us", "them"])
});

pub(crate) static AUXILIARIES: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    set(&[
        "be", "is", "are", "was", "were", "been", "being", "am", "do", "does", "did", "have",
        "has", "had", "having", "will", "would", "shall", "should", "can", "could", "may",
        "might", "must", "ca", "wo",
    ])
});

pub(crate) static ADPOSITIONS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    set(&[
        "of", "in", "on", "at", "by", "for", "with", "about", "against", "between", "into",
        "through", "during", "before", "after", "above", "below", "to", "from", "up", "down",
        "over", "under", "near", "across", "throughout", "within", "without", "among", "along",
        "around", "behind", "beyond", "despite", "except", "inside", "outside", "since",
        "toward", "towards", "upon", "via", "per", "onto", "like", "than",
    ])
});

pub(crate) static CONJUNCTIONS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    set(&[
        "and", "or", "but", "nor", "so", "yet", "because", "although", "though", "while",
        "if", "unless", "whether", "whereas", "once", "until",
    ])
});

pub(crate) static PARTICLES: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| set(&["not", "n't", "'s", "’s"]));

pub(crate) static ADVERBS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    set(&[
        "where", "when", "why", "how", "here", "there", "then", "now", "also", "very", "too",
        "just", "still", "already", "always", "never", "often", "again", "soon", "even",
        "quite", "rather", "almost", "perhaps", "however", "thus", "therefore", "well",
        "together", "later", "ago", "ever", "once", "instead",
    ])
});

/// Base forms of frequent verbs; inflections are derived at lookup time.
pub(crate) static COMMON_VERBS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    set(&[
        "accept", "add", "allow", "appear", "apply", "ask", "become", "begin", "believe",
        "bring", "build", "buy", "call", "carry", "cause", "change", "choose", "come",
        "consider", "contain", "continue", "create", "decide", "define", "describe", "develop",
        "die", "discover", "elect", "establish", "expect", "explain", "fall", "feel", "find",
        "follow", "found", "get", "give", "go", "govern", "grow", "happen", "hear", "help",
        "hold", "include", "increase", "invent", "involve", "join", "keep", "know", "lead",
        "learn", "leave", "let", "like", "live", "look", "lose", "love", "make", "mean", "meet",
        "move", "need", "offer", "open", "pay", "play", "produce", "provide", "publish", "put",
        "reach", "read", "receive", "reduce", "remain", "remember", "report", "require",
        "return", "run", "say", "see", "seem", "sell", "send", "serve", "set", "show", "sit",
        "speak", "spend", "stand", "start", "stay", "stop", "suggest", "support", "take",
        "talk", "teach", "tell", "tend", "think", "try", "turn", "understand", "use", "visit",
        "wait", "walk", "want", "watch", "win", "work", "write",
    ])
});

pub(crate) static IRREGULAR_VERBS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    set(&[
        "began", "begun", "became", "bought", "brought", "built", "caught", "chose", "chosen",
        "came", "did", "done", "drew", "drawn", "fell", "fallen", "felt", "found", "gave",
        "given", "went", "gone", "got", "gotten", "grew", "grown", "held", "heard", "kept",
        "knew", "known", "led", "left", "lost", "made", "meant", "met", "paid", "ran", "read",
        "said", "saw", "seen", "sent", "sold", "sat", "spoke", "spoken", "spent", "stood",
        "took", "taken", "taught", "told", "thought", "understood", "won", "wrote", "written",
    ])
});

pub(crate) static COMMON_ADJECTIVES: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    set(&[
        "able", "bad", "big", "black", "certain", "clear", "close", "common", "current",
        "dark", "different", "early", "easy", "economic", "entire", "false", "few", "fine",
        "free", "full", "good", "great", "hard", "high", "huge", "important", "large", "late",
        "little", "long", "low", "main", "major", "many", "modern", "much", "new", "next",
        "old", "open", "other", "own", "past", "possible", "poor", "public", "real", "recent",
        "red", "rich", "right", "same", "short", "significant", "similar", "simple", "small",
        "social", "special", "strong", "sure", "true", "whole", "wide", "white", "wrong",
        "young",
    ])
});

pub(crate) const ADJECTIVE_SUFFIXES: &[&str] =
    &["ical", "ional", "ful", "ous", "ive", "able", "ible", "less", "ish"];

pub(crate) const VERB_SUFFIXES: &[&str] = &["ize", "ise", "ify"];

pub(crate) static MONTHS_AND_DAYS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    set(&[
        "january", "february", "march", "april", "may", "june", "july", "august", "september",
        "october", "november", "december", "monday", "tuesday", "wednesday", "thursday",
        "friday", "saturday", "sunday",
    ])
});

pub(crate) static HONORIFICS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    set(&["mr", "mrs", "ms", "miss", "dr", "prof", "professor", "sir", "dame", "lord", "lady"])
});

pub(crate) static ORG_WORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    set(&[
        "inc", "corp", "corporation", "company", "co", "ltd", "llc", "plc", "university",
        "institute", "bank", "group", "association", "agency", "foundation", "ministry",
        "department", "council", "committee", "party", "college", "school", "hospital",
        "society", "organization", "organisation", "commission", "union",
    ])
});

pub(crate) static LOCATIVE_PREPOSITIONS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    set(&["in", "at", "from", "near", "across", "throughout", "of", "to", "into", "within"])
});

pub(crate) static CURRENCY_WORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    set(&["dollar", "dollars", "euro", "euros", "pound", "pounds", "usd", "eur", "gbp", "yen"])
});

/// Abbreviations whose trailing period does not end a sentence.
pub(crate) static ABBREVIATIONS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    set(&[
        "mr", "mrs", "ms", "dr", "prof", "st", "jr", "sr", "vs", "etc", "inc", "ltd", "co",
        "corp", "no", "fig", "e.g", "i.e", "approx", "dept", "est", "gen", "gov", "mt", "u.s",
    ])
});
