use super::*;

#[test]
fn accepts_well_formed_ids() {
    assert!(is_valid_video_id("dQw4w9WgXcQ"));
    assert!(is_valid_video_id("a-b_c-d_e-f"));
}

#[test]
fn rejects_wrong_length() {
    assert!(!is_valid_video_id(""));
    assert!(!is_valid_video_id("dQw4w9WgXc"));
    assert!(!is_valid_video_id("dQw4w9WgXcQQ"));
}

#[test]
fn rejects_url_characters() {
    assert!(!is_valid_video_id("dQw4w9W?XcQ"));
    assert!(!is_valid_video_id("../../etc/p"));
    assert!(!is_valid_video_id("dQw4w9WgXcé"));
}

#[test]
fn video_details_serialize_as_title_and_artist() {
    let details = VideoDetails { title: "Song".into(), artist: "Band".into() };
    assert_eq!(serde_json::to_value(details).unwrap(), serde_json::json!({"title": "Song", "artist": "Band"}));
}
