use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashSet;

lazy_static! {
    static ref RE: Regex = Regex::new(r"\b\w\w+\b").expect("valid regex");
    static ref STOPWORDS: HashSet<&'static str> = {
        let english: &[&str] = &[
            "a","about","above","after","again","against","ain","all","am","an","and","any","are","aren","aren't","as","at",
            "be","because","been","before","being","below","between","both","but","by",
            "can","couldn","couldn't",
            "d","did","didn","didn't","do","does","doesn","doesn't","doing","don","don't","down","during",
            "each","few","for","from","further",
            "had","hadn","hadn't","has","hasn","hasn't","have","haven","haven't","having","he","her","here","hers","herself","him","himself","his","how",
            "i","if","in","into","is","isn","isn't","it","it's","its","itself",
            "just","ll","m","ma","me","mightn","mightn't","more","most","mustn","mustn't","my","myself",
            "needn","needn't","no","nor","not","now",
            "o","of","off","on","once","only","or","other","our","ours","ourselves","out","over","own",
            "re","s","same","shan","shan't","she","she's","should","should've","shouldn","shouldn't","so","some","such",
            "t","than","that","that'll","the","their","theirs","them","themselves","then","there","these","they","this","those","through","to","too",
            "under","until","up","ve","very",
            "was","wasn","wasn't","we","were","weren","weren't","what","when","where","which","while","who","whom","why","will","with","won","won't","wouldn","wouldn't",
            "y","you","you'd","you'll","you're","you've","your","yours","yourself","yourselves",
        ];
        let russian: &[&str] = &[
            "а","без","более","больше","будет","будто","бы","был","была","были","было","быть",
            "в","вам","вас","вдруг","ведь","во","вот","впрочем","все","всегда","всего","всех","всю","вы",
            "где","да","даже","два","для","до","другой","его","ее","ей","ему","если","есть","еще",
            "ж","же","за","зачем","здесь","и","из","или","им","иногда","их",
            "к","как","какая","какой","когда","конечно","кто","куда",
            "ли","лучше","между","меня","мне","много","может","можно","мой","моя","мы",
            "на","над","надо","наконец","нас","не","него","нее","ней","нельзя","нет","ни","нибудь","никогда","ним","них","ничего","но","ну",
            "о","об","один","он","она","они","опять","от","перед","по","под","после","потом","потому","почти","при","про",
            "раз","разве","с","сам","свою","себе","себя","сейчас","со","совсем",
            "так","такой","там","тебя","тем","теперь","то","тогда","того","тоже","только","том","тот","три","тут","ты",
            "у","уж","уже","хорошо","хоть","чего","чем","через","что","чтоб","чтобы","чуть",
            "эти","этого","этой","этом","этот","эту","я",
        ];
        english.iter().chain(russian.iter()).copied().collect()
    };
}

pub fn is_stopword(token: &str) -> bool { STOPWORDS.contains(token) }

/// Split text into lowercase word tokens of at least two word characters, dropping stop words.
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    RE.find_iter(&lowered)
        .map(|m| m.as_str())
        .filter(|t| !is_stopword(t))
        .map(str::to_string)
        .collect()
}

/// Contiguous word n-grams for every n in `min_n..=max_n`, joined by a single space.
/// Unigrams come first, followed by bigrams, and so on.
pub fn ngrams(tokens: &[String], min_n: usize, max_n: usize) -> Vec<String> {
    let min_n = min_n.max(1);
    let mut out = Vec::new();
    for n in min_n..=max_n {
        if n > tokens.len() { break; }
        for window in tokens.windows(n) {
            out.push(window.join(" "));
        }
    }
    out
}

/// The full analyzer: tokenize, then expand into n-grams.
pub fn analyze(text: &str, ngram_range: (usize, usize)) -> Vec<String> {
    let tokens = tokenize(text);
    ngrams(&tokens, ngram_range.0, ngram_range.1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_tokenize() {
        let t = tokenize("Intro to Vectors, and a matrix!");
        assert_eq!(t, vec!["intro", "vectors", "matrix"]);
    }

    #[test]
    fn ngrams_skip_removed_stopwords() {
        let t = tokenize("intro to vectors");
        let grams = ngrams(&t, 1, 3);
        assert_eq!(grams, vec!["intro", "vectors", "intro vectors"]);
    }
}
