mod common;

use std::fs;
use std::sync::Arc;

use common::{jpeg_with_orientation, DenyAll, Harness, MemorySource, ORIENTATION_ROTATE_90};
use media_bridge::broker::{CameraDevice, PickerAction, PickerEvent, VideoQuality};
use media_bridge::media::{PickMediaOptions, StoreCameraOptions, VideoOptions};
use media_bridge::resolver::ContentLocator;
use media_bridge::transform::PhotoSize;
use media_bridge::MediaError;

#[tokio::test]
async fn take_photo_rotates_and_scales_the_captured_image() {
    let mut harness = Harness::new("take-photo");
    let service = &harness.service;
    let directives = &mut harness.directives;
    let sink = service.event_sink();

    let options = StoreCameraOptions {
        directory: "trips".to_string(),
        photo_size: PhotoSize::Medium,
        compression_quality: Some(80),
        ..StoreCameraOptions::default()
    };

    let camera = async move {
        let directive = directives.recv().await.expect("launch directive");
        assert_eq!(directive.action, PickerAction::Capture);
        assert_eq!(directive.media_type_filter, "image/*");
        assert_eq!(directive.options.camera_facing, Some(CameraDevice::Rear));

        let target = directive.options.target_path.clone().expect("reserved target path");
        fs::write(&target, jpeg_with_orientation(4000, 3000, ORIENTATION_ROTATE_90))
            .expect("camera writes capture");
        assert!(sink.deliver(PickerEvent::success(directive.correlation_id, Vec::new())));
    };

    let (result, ()) = tokio::join!(service.take_photo(options), camera);
    let file = result.expect("take photo").expect("photo captured");

    assert!(!file.is_temporary_copy());
    assert!(file.path().starts_with(harness.root.join("media").join("Pictures").join("trips")));
    assert!(harness.root.join("media/Pictures/trips/.nomedia").exists());
    assert_eq!(image::image_dimensions(file.path()).expect("read dimensions"), (1500, 2000));
}

#[tokio::test]
async fn take_photo_moves_foreign_capture_into_reserved_path() {
    let mut harness = Harness::new("take-foreign");
    let service = &harness.service;
    let directives = &mut harness.directives;
    let sink = service.event_sink();
    let foreign = harness.root.join("camera-app").join("DSC_0001.jpg");
    fs::create_dir_all(foreign.parent().expect("foreign parent")).expect("create camera dir");
    fs::write(&foreign, jpeg_with_orientation(40, 30, 1)).expect("write foreign capture");

    let foreign_locator = ContentLocator::from_path(&foreign);
    let camera = async move {
        let directive = directives.recv().await.expect("launch directive");
        sink.deliver(PickerEvent::success(directive.correlation_id, vec![foreign_locator]));
        directive.options.target_path.expect("reserved target path")
    };

    let (result, target) = tokio::join!(service.take_photo(StoreCameraOptions::default()), camera);
    let file = result.expect("take photo").expect("photo captured");

    assert_eq!(file.path(), target.as_path());
    assert!(target.exists());
    assert!(!foreign.exists());
}

#[tokio::test]
async fn take_photo_canceled_returns_none() {
    let mut harness = Harness::new("take-cancel");
    let service = &harness.service;
    let directives = &mut harness.directives;
    let sink = service.event_sink();

    let camera = async move {
        let directive = directives.recv().await.expect("launch directive");
        let target = directive.options.target_path.clone().expect("reserved target path");
        fs::write(&target, b"").expect("camera leaves an empty file");
        sink.deliver(PickerEvent::canceled(directive.correlation_id));
        target
    };

    let (result, target) = tokio::join!(service.take_photo(StoreCameraOptions::default()), camera);
    assert!(result.expect("cancel is not an error").is_none());
    assert!(!target.exists());
}

#[tokio::test]
async fn take_photo_rejects_absolute_directory_before_launch() {
    let mut harness = Harness::new("take-invalid");
    let options = StoreCameraOptions {
        directory: "/sdcard/DCIM".to_string(),
        ..StoreCameraOptions::default()
    };

    let result = harness.service.take_photo(options).await;
    assert!(matches!(result, Err(MediaError::InvalidOptions(_))));
    assert!(harness.directives.try_recv().is_err());
}

#[tokio::test]
async fn pick_photo_canceled_returns_empty() {
    let mut harness = Harness::new("pick-cancel");
    let service = &harness.service;
    let directives = &mut harness.directives;
    let sink = service.event_sink();

    let gallery = async move {
        let directive = directives.recv().await.expect("launch directive");
        assert_eq!(directive.action, PickerAction::Pick);
        assert!(directive.options.allow_multiple);
        sink.deliver(PickerEvent::canceled(directive.correlation_id));
    };

    let (result, ()) = tokio::join!(service.pick_photo(PickMediaOptions::default()), gallery);
    assert!(result.expect("cancel is not an error").is_empty());
}

#[tokio::test]
async fn overlapping_launch_fails_immediately() {
    let mut harness = Harness::new("overlap");
    let service = &harness.service;
    let directives = &mut harness.directives;
    let sink = service.event_sink();

    let gallery = async move {
        let directive = directives.recv().await.expect("launch directive");

        let second = service.pick_video().await;
        assert!(matches!(second, Err(MediaError::ConcurrentRequest)));

        sink.deliver(PickerEvent::canceled(directive.correlation_id));
    };

    let (first, ()) = tokio::join!(service.pick_photo(PickMediaOptions::default()), gallery);
    assert!(first.expect("first request unaffected").is_empty());
}

#[tokio::test]
async fn mismatched_event_is_ignored() {
    let mut harness = Harness::new("mismatch");
    let service = &harness.service;
    let directives = &mut harness.directives;
    let sink = service.event_sink();

    let gallery = async move {
        let directive = directives.recv().await.expect("launch directive");
        let stale = media_bridge::broker::CorrelationId::new(directive.correlation_id.get() + 1);
        assert!(!sink.deliver(PickerEvent::failed(stale, "stale")));
        assert!(sink.deliver(PickerEvent::canceled(directive.correlation_id)));
    };

    let (result, ()) = tokio::join!(service.pick_photo(PickMediaOptions::default()), gallery);
    assert!(result.expect("stale event must not fail the request").is_empty());
}

#[tokio::test]
async fn platform_failure_is_propagated() {
    let mut harness = Harness::new("platform-error");
    let service = &harness.service;
    let directives = &mut harness.directives;
    let sink = service.event_sink();

    let gallery = async move {
        let directive = directives.recv().await.expect("launch directive");
        sink.deliver(PickerEvent::failed(directive.correlation_id, "gallery crashed"));
    };

    let (result, ()) = tokio::join!(service.pick_photo(PickMediaOptions::default()), gallery);
    assert!(matches!(
        result,
        Err(MediaError::PlatformReported(cause)) if cause == "gallery crashed"
    ));
}

#[tokio::test]
async fn unresolvable_locator_fails_whole_pick() {
    let mut harness = Harness::new("not-found");
    let present = harness.root.join("present.jpg");
    fs::write(&present, jpeg_with_orientation(8, 8, 1)).expect("write present file");
    let missing = harness.root.join("missing.jpg");

    let service = &harness.service;
    let directives = &mut harness.directives;
    let sink = service.event_sink();

    let locators = vec![ContentLocator::from_path(&present), ContentLocator::from_path(&missing)];
    let gallery = async move {
        let directive = directives.recv().await.expect("launch directive");
        sink.deliver(PickerEvent::success(directive.correlation_id, locators));
    };

    let (result, ()) = tokio::join!(service.pick_photo(PickMediaOptions::default()), gallery);
    assert!(matches!(result, Err(MediaError::MediaNotFound(_))));
    assert!(present.exists());
}

#[tokio::test]
async fn content_handles_are_copied_and_cleaned_up_on_drop() {
    let source = MemorySource::default().with("content://media/video/1", b"mp4-bytes");
    let mut harness = Harness::with_source("content-copy", Arc::new(source));
    let service = &harness.service;
    let directives = &mut harness.directives;
    let sink = service.event_sink();

    let gallery = async move {
        let directive = directives.recv().await.expect("launch directive");
        let locators = vec![ContentLocator::new("content://media/video/1")];
        sink.deliver(PickerEvent::success(directive.correlation_id, locators));
    };

    let (result, ()) = tokio::join!(service.pick_video(), gallery);
    let files = result.expect("pick videos");

    assert_eq!(files.len(), 1);
    assert!(files[0].is_temporary_copy());
    assert!(files[0].path().starts_with(harness.root.join("media/Movies/temp")));
    assert_eq!(fs::read(files[0].path()).expect("read copy"), b"mp4-bytes");

    drop(files);
    assert_eq!(harness.temp_entries("Movies"), vec![".nomedia".to_string()]);
}

#[tokio::test]
async fn failed_resolution_disposes_copies_already_made() {
    let source = MemorySource::default().with("content://ok", b"mp4-bytes");
    let mut harness = Harness::with_source("copy-then-fail", Arc::new(source));
    let service = &harness.service;
    let directives = &mut harness.directives;
    let sink = service.event_sink();

    let gallery = async move {
        let directive = directives.recv().await.expect("launch directive");
        let locators = vec![
            ContentLocator::new("content://ok"),
            ContentLocator::new("content://gone"),
        ];
        sink.deliver(PickerEvent::success(directive.correlation_id, locators));
    };

    let (result, ()) = tokio::join!(service.pick_video(), gallery);

    assert!(matches!(
        result,
        Err(MediaError::MediaNotFound(locator)) if locator == "content://gone"
    ));
    assert_eq!(harness.temp_entries("Movies"), vec![".nomedia".to_string()]);
}

#[tokio::test]
async fn standalone_normalize_rotates_local_file() {
    let harness = Harness::new("standalone-normalize");
    let path = harness.root.join("standalone.jpg");
    fs::write(&path, jpeg_with_orientation(40, 20, ORIENTATION_ROTATE_90)).expect("write image");

    let rewritten = harness
        .service
        .normalize(&path, PhotoSize::Full, 90)
        .await
        .expect("normalize");
    assert!(rewritten);
    assert_eq!(image::image_dimensions(&path).expect("dimensions"), (20, 40));

    let resized = harness
        .service
        .resize(&path, PhotoSize::Medium, 90)
        .await
        .expect("resize");
    assert!(resized);
    assert_eq!(image::image_dimensions(&path).expect("dimensions"), (10, 20));
}

#[tokio::test]
async fn picked_photos_are_normalized_in_order() {
    let mut harness = Harness::new("pick-normalize");
    let rotated = harness.root.join("rotated.jpg");
    let upright = harness.root.join("upright.jpg");
    fs::write(&rotated, jpeg_with_orientation(40, 20, ORIENTATION_ROTATE_90))
        .expect("write rotated");
    fs::write(&upright, jpeg_with_orientation(30, 10, 1)).expect("write upright");

    let service = &harness.service;
    let directives = &mut harness.directives;
    let sink = service.event_sink();

    let locators = vec![ContentLocator::from_path(&rotated), ContentLocator::from_path(&upright)];
    let gallery = async move {
        let directive = directives.recv().await.expect("launch directive");
        sink.deliver(PickerEvent::success(directive.correlation_id, locators));
    };

    let (result, ()) = tokio::join!(service.pick_photo(PickMediaOptions::default()), gallery);
    let files = result.expect("pick photos");

    assert_eq!(files.len(), 2);
    assert_eq!(files[0].path(), rotated.as_path());
    assert_eq!(files[1].path(), upright.as_path());
    assert!(files.iter().all(|f| !f.is_temporary_copy()));
    assert_eq!(image::image_dimensions(&rotated).expect("rotated dimensions"), (20, 40));
    assert_eq!(image::image_dimensions(&upright).expect("upright dimensions"), (30, 10));
}

#[tokio::test]
async fn transform_failure_returns_original_file() {
    let mut harness = Harness::new("transform-failure");
    let broken = harness.root.join("broken.jpg");
    fs::write(&broken, b"definitely not a jpeg").expect("write broken file");

    let service = &harness.service;
    let directives = &mut harness.directives;
    let sink = service.event_sink();

    let locator = vec![ContentLocator::from_path(&broken)];
    let gallery = async move {
        let directive = directives.recv().await.expect("launch directive");
        sink.deliver(PickerEvent::success(directive.correlation_id, locator));
    };

    let options = PickMediaOptions {
        photo_size: PhotoSize::Small,
        compression_quality: Some(50),
    };
    let (result, ()) = tokio::join!(service.pick_photo(options), gallery);
    let files = result.expect("transform errors are swallowed");

    assert_eq!(files.len(), 1);
    assert_eq!(fs::read(&broken).expect("read broken file"), b"definitely not a jpeg");
}

#[tokio::test]
async fn pick_is_capped_at_configured_limit() {
    let mut harness = Harness::new("pick-limit");
    let limit = harness.service.config().max_picked_items;
    let locators: Vec<ContentLocator> = (0..limit + 5)
        .map(|i| {
            let path = harness.root.join(format!("clip-{i}.mp4"));
            fs::write(&path, b"video").expect("write clip");
            ContentLocator::from_path(path)
        })
        .collect();

    let service = &harness.service;
    let directives = &mut harness.directives;
    let sink = service.event_sink();

    let gallery = async move {
        let directive = directives.recv().await.expect("launch directive");
        assert_eq!(directive.media_type_filter, "video/*");
        sink.deliver(PickerEvent::success(directive.correlation_id, locators));
    };

    let (result, ()) = tokio::join!(service.pick_video(), gallery);
    assert_eq!(result.expect("pick videos").len(), limit);
}

#[tokio::test]
async fn pick_without_storage_permission_never_launches() {
    let mut harness = Harness::with_permissions("denied", Arc::new(DenyAll));

    let result = harness.service.pick_photo(PickMediaOptions::default()).await;
    assert!(matches!(result, Err(MediaError::PermissionDenied)));
    assert!(harness.directives.try_recv().is_err());
}

#[tokio::test]
async fn take_video_forwards_recording_hints() {
    let mut harness = Harness::new("take-video");
    let service = &harness.service;
    let directives = &mut harness.directives;
    let sink = service.event_sink();

    let options = VideoOptions {
        directory: "clips".to_string(),
        name: Some("birthday".to_string()),
        desired_length: Some(30),
        quality: VideoQuality::Low,
        default_camera: CameraDevice::Front,
        save_to_album: true,
    };

    let camera = async move {
        let directive = directives.recv().await.expect("launch directive");
        assert_eq!(directive.media_type_filter, "video/*");
        assert_eq!(directive.options.max_duration_seconds, Some(30));
        assert_eq!(directive.options.video_quality, Some(VideoQuality::Low));
        assert_eq!(directive.options.camera_facing, Some(CameraDevice::Front));
        assert_eq!(directive.options.save_to_public_album, Some(true));
        assert_eq!(directive.options.display_name_hint.as_deref(), Some("birthday.mp4"));

        let target = directive.options.target_path.clone().expect("reserved target path");
        fs::write(&target, b"mp4").expect("camera writes video");
        sink.deliver(PickerEvent::success(directive.correlation_id, Vec::new()));
    };

    let (result, ()) = tokio::join!(service.take_video(options), camera);
    let file = result.expect("take video").expect("video captured");

    assert_eq!(file.path(), harness.root.join("album/Movies/clips/birthday.mp4").as_path());
    assert!(!harness.root.join("album/Movies/clips/.nomedia").exists());
}

#[tokio::test]
async fn capabilities_follow_the_picker_surface() {
    let harness = Harness::new("capabilities");
    assert!(harness.service.is_camera_available());
    assert!(harness.service.is_take_photo_supported());
    assert!(harness.service.is_pick_video_supported());
}
