use askama::Template;
use luneva_core::content::VideoBanner;

use super::RenderContext;
use super::hero::non_empty;
use crate::views::{CONTENT_IMAGE_WIDTH, LinkView};

#[derive(Template)]
#[template(path = "sections/video_banner.html")]
pub struct VideoBannerSection {
    pub id: String,
    pub title: String,
    pub video_url: String,
    pub mobile_video_url: Option<String>,
    pub poster_url: Option<String>,
    pub overlay_text: Option<String>,
    pub overlay_subtext: Option<String>,
    pub cta: Option<LinkView>,
    pub autoplay: bool,
    pub loops: bool,
    pub muted: bool,
}

impl VideoBannerSection {
    /// `None` when no video has been uploaded.
    #[must_use]
    pub fn build(banner: &VideoBanner, ctx: &RenderContext<'_>) -> Option<Self> {
        let video_url = non_empty(banner.video.as_deref())?.to_string();
        let cta = match (
            non_empty(banner.cta_text.as_deref()),
            non_empty(banner.cta_link.as_deref()),
        ) {
            (Some(text), Some(link)) => Some(LinkView::cta(text, link, ctx.links)),
            _ => None,
        };

        Some(Self {
            id: banner.id.clone(),
            title: banner.title.clone().unwrap_or_default(),
            video_url,
            mobile_video_url: non_empty(banner.mobile_video.as_deref()).map(str::to_string),
            poster_url: banner
                .poster_image
                .as_ref()
                .and_then(|image| image.builder())
                .map(|builder| builder.width(CONTENT_IMAGE_WIDTH).build()),
            overlay_text: non_empty(banner.overlay_text.as_deref()).map(str::to_string),
            overlay_subtext: non_empty(banner.overlay_subtext.as_deref()).map(str::to_string),
            cta,
            autoplay: banner.autoplay(),
            loops: banner.loops(),
            muted: banner.muted(),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use luneva_core::content::LinkResolver;

    use super::*;

    #[test]
    fn test_playback_flags_default_on() {
        let resolver = LinkResolver::default();
        let ctx = RenderContext { links: &resolver };
        let banner: VideoBanner = serde_json::from_str(
            r#"{"_id":"v","video":"https://cdn.sanity.io/files/p/d/v.mp4","loop":false}"#,
        )
        .unwrap();
        let view = VideoBannerSection::build(&banner, &ctx).unwrap();
        assert!(view.autoplay);
        assert!(!view.loops);
        assert!(view.muted);

        let html = view.render().unwrap();
        assert!(html.contains("autoplay"));
        assert!(!html.contains(" loop"));
        assert!(html.contains("playsinline"));
    }

    #[test]
    fn test_mobile_source_is_optional() {
        let resolver = LinkResolver::default();
        let ctx = RenderContext { links: &resolver };
        let banner: VideoBanner = serde_json::from_str(
            r#"{"_id":"v","video":"https://cdn.sanity.io/files/p/d/v.mp4","mobileVideo":"https://cdn.sanity.io/files/p/d/m.mp4"}"#,
        )
        .unwrap();
        let html = VideoBannerSection::build(&banner, &ctx).unwrap().render().unwrap();
        assert!(html.contains("media=\"(max-width: 767px)\""));
        assert!(html.contains("m.mp4"));
    }
}
