use gift_shop_bot::broadcast::content::{
    group_caption, parse_button_target, ButtonTargetError, MediaItem, MediaKind, PostContent,
};

fn photo(file_id: &str, caption: Option<&str>) -> MediaItem {
    MediaItem::new(MediaKind::Photo, file_id, caption.map(|c| c.to_string()))
}

#[test]
fn test_group_caption_takes_the_last_non_empty_one() {
    let items = vec![
        photo("p1", Some("first")),
        photo("p2", None),
        photo("p3", Some("Sale!")),
    ];
    assert_eq!(group_caption(&items), Some("Sale!"));

    // blank captions do not count
    let items = vec![photo("p1", Some("kept")), photo("p2", Some("   "))];
    assert_eq!(group_caption(&items), Some("kept"));
}

#[test]
fn test_group_caption_is_absent_when_no_item_is_captioned() {
    let items = vec![photo("p1", None), photo("p2", Some(""))];
    assert_eq!(group_caption(&items), None);
    assert_eq!(group_caption(&[]), None);
}

#[test]
fn test_single_item_extraction() {
    let content = PostContent::Video {
        file_id: "v1".to_string(),
        caption: Some("clip".to_string()),
    };
    let item = content.single_item().expect("item missing");
    assert_eq!(item.kind, MediaKind::Video);
    assert_eq!(item.file_id, "v1");
    assert_eq!(item.caption.as_deref(), Some("clip"));

    let text = PostContent::Text {
        body: "hello".to_string(),
    };
    assert!(text.single_item().is_none());
    let group = PostContent::MediaGroup { items: Vec::new() };
    assert!(group.single_item().is_none());
}

#[test]
fn test_content_emptiness() {
    assert!(PostContent::Text {
        body: "  ".to_string()
    }
    .is_empty());
    assert!(PostContent::MediaGroup { items: Vec::new() }.is_empty());
    assert!(!PostContent::Text {
        body: "hi".to_string()
    }
    .is_empty());
    assert!(!PostContent::Photo {
        file_id: "p".to_string(),
        caption: None
    }
    .is_empty());
}

#[test]
fn test_button_target_accepts_http_and_https() {
    assert_eq!(
        parse_button_target("https://example.com/sale").expect("https").as_str(),
        "https://example.com/sale"
    );
    assert_eq!(
        parse_button_target("  http://example.com  ").expect("http").as_str(),
        "http://example.com/"
    );
}

#[test]
fn test_button_target_rejects_other_schemes_and_plain_text() {
    for bad in ["example.com", "ftp://example.com", "tg://resolve", "", "just words"] {
        assert!(matches!(
            parse_button_target(bad),
            Err(ButtonTargetError::MissingScheme(_))
        ));
    }
}

#[test]
fn test_button_target_rejects_malformed_urls() {
    assert!(matches!(
        parse_button_target("http://"),
        Err(ButtonTargetError::Malformed(_))
    ));
}
