/// A link laid over `[start, end)` of the sample text, in characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct SampleLink {
    pub(super) start: usize,
    pub(super) end: usize,
    pub(super) href: &'static str,
}

const SAMPLE_SEGMENTS: &[(&str, Option<&str>)] = &[
    ("Wow, this editor has support for links to the whole ", None),
    (
        "world wide web",
        Some("https://en.wikipedia.org/wiki/World_Wide_Web"),
    ),
    (
        ". We tested a lot of URLs and I think you can add every URL you want. \
         Isn't that cool? Let's try ",
        None,
    ),
    ("another one!", Some("https://statamic.com/")),
    (" Yep, seems to work.\n\n", None),
    (
        "Put the cursor inside a link to see its actions. Edit rewrites the \
         whole link; open hands it to your browser.",
        None,
    ),
];

pub(super) fn sample_content() -> (String, Vec<SampleLink>) {
    let mut text = String::new();
    let mut links = Vec::new();
    let mut offset = 0;
    for &(segment, href) in SAMPLE_SEGMENTS {
        let length = segment.chars().count();
        if let Some(href) = href {
            links.push(SampleLink {
                start: offset,
                end: offset + length,
                href,
            });
        }
        text.push_str(segment);
        offset += length;
    }
    (text, links)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn links_cover_their_anchor_text() {
        let (text, links) = sample_content();
        let chars: Vec<char> = text.chars().collect();
        let anchors: Vec<String> = links
            .iter()
            .map(|link| chars[link.start..link.end].iter().collect())
            .collect();

        assert_eq!(anchors, vec!["world wide web", "another one!"]);
        assert_eq!(links[1].href, "https://statamic.com/");
    }
}
