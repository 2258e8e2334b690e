//! Flex message model and the carousel reply sent for text messages.
//!
//! Only the components the carousel uses are modelled. Optional properties are
//! omitted from the JSON when unset so the platform applies its own defaults.

use crate::reply::ReplyItem;
use serde::Serialize;

/// Messaging API limit on bubbles per carousel.
pub const MAX_CAROUSEL_BUBBLES: usize = 12;

/// Number of icons in a bubble's rating row.
pub const RATING_ICONS: usize = 5;

pub const CAROUSEL_ALT_TEXT: &str = "タイトル";

const GOLD_STAR_URL: &str =
    "https://scdn.line-apps.com/n/channel_devcenter/img/fx/review_gold_star_28.png";
const GRAY_STAR_URL: &str =
    "https://scdn.line-apps.com/n/channel_devcenter/img/fx/review_gray_star_28.png";
const CAPTION_COLOR: &str = "#8c8c8c";

/// Top-level flex container.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FlexContainer {
    Carousel(Carousel),
    Bubble(Bubble),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename = "carousel")]
pub struct Carousel {
    pub contents: Vec<Bubble>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename = "bubble", rename_all = "camelCase")]
pub struct Bubble {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hero: Option<FlexComponent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<FlexComponent>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FlexComponent {
    Box(FlexBox),
    Text(FlexText),
    Icon(FlexIcon),
    Image(FlexImage),
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlexBox {
    pub layout: String,
    pub contents: Vec<FlexComponent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spacing: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub padding_all: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlexText {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub margin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wrap: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flex: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlexIcon {
    pub url: String,
    pub size: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlexImage {
    pub url: String,
    pub size: String,
    pub aspect_mode: String,
    pub aspect_ratio: String,
}

/// Static content for one carousel card.
struct Venue {
    title: &'static str,
    image_url: &'static str,
    rating: f32,
    caption: &'static str,
}

const VENUES: [Venue; 3] = [
    Venue {
        title: "Brown Cafe",
        image_url: "https://scdn.line-apps.com/n/channel_devcenter/img/flexsnapshot/clip/clip10.jpg",
        rating: 4.0,
        caption: "東京旅行",
    },
    Venue {
        title: "Brow&Cony's Restaurant",
        image_url: "https://scdn.line-apps.com/n/channel_devcenter/img/flexsnapshot/clip/clip11.jpg",
        rating: 4.0,
        caption: "東京旅行",
    },
    Venue {
        title: "Tata",
        image_url: "https://scdn.line-apps.com/n/channel_devcenter/img/flexsnapshot/clip/clip12.jpg",
        rating: 4.0,
        caption: "東京旅行",
    },
];

/// Carousel reply for text messages: one micro bubble per venue.
pub fn carousel_message() -> ReplyItem {
    let contents: Vec<Bubble> = VENUES.iter().map(venue_bubble).collect();
    debug_assert!(contents.len() <= MAX_CAROUSEL_BUBBLES);
    ReplyItem::Flex {
        alt_text: CAROUSEL_ALT_TEXT.to_string(),
        contents: FlexContainer::Carousel(Carousel { contents }),
    }
}

fn venue_bubble(venue: &Venue) -> Bubble {
    let title = FlexComponent::Text(FlexText {
        text: venue.title.to_string(),
        weight: Some("bold".into()),
        size: Some("sm".into()),
        wrap: Some(true),
        ..Default::default()
    });
    let caption_row = FlexComponent::Box(FlexBox {
        layout: "vertical".into(),
        contents: vec![FlexComponent::Box(FlexBox {
            layout: "baseline".into(),
            spacing: Some("sm".into()),
            contents: vec![FlexComponent::Text(FlexText {
                text: venue.caption.to_string(),
                wrap: Some(true),
                color: Some(CAPTION_COLOR.into()),
                size: Some("xs".into()),
                flex: Some(5),
                ..Default::default()
            })],
            ..Default::default()
        })],
        ..Default::default()
    });
    Bubble {
        size: Some("micro".into()),
        hero: Some(FlexComponent::Image(FlexImage {
            url: venue.image_url.to_string(),
            size: "full".into(),
            aspect_mode: "cover".into(),
            aspect_ratio: "320:213".into(),
        })),
        body: Some(FlexComponent::Box(FlexBox {
            layout: "vertical".into(),
            contents: vec![title, rating_row(venue.rating), caption_row],
            spacing: Some("sm".into()),
            padding_all: Some("13px".into()),
        })),
    }
}

/// Baseline row of five star icons (gold per whole rating point) followed by the rating label.
fn rating_row(rating: f32) -> FlexComponent {
    let filled = (rating.max(0.0).floor() as usize).min(RATING_ICONS);
    let mut contents: Vec<FlexComponent> = (0..RATING_ICONS)
        .map(|i| {
            let url = if i < filled { GOLD_STAR_URL } else { GRAY_STAR_URL };
            FlexComponent::Icon(FlexIcon {
                url: url.to_string(),
                size: "xs".into(),
            })
        })
        .collect();
    contents.push(FlexComponent::Text(FlexText {
        text: format!("{:.1}", rating),
        size: Some("sm".into()),
        color: Some(CAPTION_COLOR.into()),
        margin: Some("md".into()),
        flex: Some(0),
        ..Default::default()
    }));
    FlexComponent::Box(FlexBox {
        layout: "baseline".into(),
        contents,
        ..Default::default()
    })
}
