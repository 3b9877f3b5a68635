//! GROQ queries for the content API.
//!
//! Singletons are fetched by type with no further filter. Image fields
//! dereference their asset so every document arrives with CDN URLs.

macro_rules! image_projection {
    () => {
        "{_type, alt, asset->{_id, _type, url, metadata}, hotspot, crop}"
    };
}

macro_rules! link_projection {
    () => {
        "{title, type, url, collectionHandle}"
    };
}

macro_rules! hero_fields {
    () => {
        concat!(
            "_id, _type, title, subtitle, image ",
            image_projection!(),
            ", ctaText, ctaLink, isActive"
        )
    };
}

macro_rules! video_banner_fields {
    () => {
        concat!(
            "_id, _type, title, \"video\": video.asset->url, \"mobileVideo\": mobileVideo.asset->url, ",
            "posterImage ",
            image_projection!(),
            ", overlayText, overlaySubtext, ctaText, ctaLink, autoplay, loop, muted, isActive"
        )
    };
}

pub const HEADER: &str = concat!(
    "*[_type == \"header\"][0]{_id, _type, logo ",
    image_projection!(),
    ", menu[]",
    link_projection!(),
    "}"
);

pub const FOOTER: &str = concat!(
    "*[_type == \"footer\"][0]{_id, _type, logo ",
    image_projection!(),
    ", usefulLinks{groupTitle, links[]",
    link_projection!(),
    "}, support{groupTitle, links[]",
    link_projection!(),
    "}, newsletter{title, description, placeholder}}"
);

pub const SETTINGS: &str = concat!(
    "*[_type == \"settings\"][0]{_id, _type, title, description, logo ",
    image_projection!(),
    ", favicon ",
    image_projection!(),
    ", ogImage ",
    image_projection!(),
    ", fonts[]{name, variableName, weights[]{weight, style, ",
    "file{asset->{_id, _type, url, extension, originalFilename}}}}}"
);

pub const ABOUT: &str = concat!(
    "*[_type == \"about\"][0]{_id, _type, title, mainImage ",
    image_projection!(),
    ", content}"
);

pub const FAQ: &str = "*[_type == \"faq\"][0]{_id, _type, title, faqs[]{question, answer}}";

pub const ACTIVE_HERO: &str = concat!(
    "*[_type == \"hero\" && isActive == true][0]{",
    hero_fields!(),
    "}"
);

pub const ACTIVE_VIDEO_BANNER: &str = concat!(
    "*[_type == \"videoBanner\" && isActive == true][0]{",
    video_banner_fields!(),
    "}"
);

pub const HOME_PAGE: &str = concat!(
    "*[_type == \"homePage\"][0]{_id, _type, title, ",
    "\"sections\": sections[]->{_id, _type, ",
    "_type == \"videoBanner\" => {",
    video_banner_fields!(),
    "}, ",
    "_type == \"hero\" => {",
    hero_fields!(),
    "}, ",
    "_type == \"textWithParagraph\" => {title, content, reverseDirection}, ",
    "_type == \"bentoGrid\" => {title, items[]{_key, layout{width, height, contentDirection, align}, ",
    "content[]{_type, ",
    "_type == \"image\" => {alt, asset->{_id, _type, url, metadata}, hotspot, crop, isBackground, expand}, ",
    "_type == \"productGrid\" => {products[]{handle}, expand}, ",
    "_type == \"richText\" => {text, expand}}}}, ",
    "_type == \"perspectiveSection\" => {items[]{_key, title, description, buttonText, buttonLink, image ",
    image_projection!(),
    "}}",
    "}, seo}"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_singleton_queries_select_first_document() {
        for query in [HEADER, FOOTER, SETTINGS, ABOUT, FAQ, HOME_PAGE] {
            assert!(query.starts_with("*[_type == \""), "{query}");
            assert!(query.contains("][0]{"), "{query}");
        }
    }

    #[test]
    fn test_active_queries_filter_on_flag() {
        assert!(ACTIVE_HERO.contains("isActive == true"));
        assert!(ACTIVE_VIDEO_BANNER.contains("\"video\": video.asset->url"));
    }

    #[test]
    fn test_home_page_dereferences_sections() {
        assert!(HOME_PAGE.contains("\"sections\": sections[]->{_id, _type, "));
        assert!(HOME_PAGE.contains("products[]{handle}"));
        assert!(HOME_PAGE.ends_with("}, seo}"));
    }
}
