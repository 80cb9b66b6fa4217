use std::path::Path;

use figment::Jail;
use retrieval_lens::LayoutSettings;
use retrieval_lens::config::DEFAULT_CONFIG_FILE;

fn load(path: Option<&Path>) -> figment::error::Result<LayoutSettings> {
    LayoutSettings::load(path).map_err(|error| error.to_string().into())
}

#[test]
fn missing_file_means_defaults() {
    Jail::expect_with(|_jail| {
        let settings = load(Some(Path::new("does-not-exist.toml")))?;
        assert_eq!(settings, LayoutSettings::default());
        Ok(())
    });
}

#[test]
fn explicit_file_overrides_defaults() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "lens.toml",
            r#"
                canvas_margin = 12.0

                [collision]
                max_iterations = 7
                padding = 2.5

                [orphans]
                cluster_threshold = 4

                [sizes.small]
                min = 0.5
                max = 1.5
            "#,
        )?;

        let settings = load(Some(Path::new("lens.toml")))?;
        let defaults = LayoutSettings::default();
        assert_eq!(settings.canvas_margin, 12.0);
        assert_eq!(settings.collision.max_iterations, 7);
        assert_eq!(settings.collision.padding, 2.5);
        assert_eq!(settings.collision.damping, defaults.collision.damping);
        assert_eq!(settings.orphans.cluster_threshold, 4);
        assert_eq!(settings.orphans.max_clusters, defaults.orphans.max_clusters);
        assert_eq!(settings.sizes.small.max, 1.5);
        assert_eq!(settings.sizes.large, defaults.sizes.large);
        Ok(())
    });
}

#[test]
fn default_file_is_picked_up_from_the_working_directory() {
    Jail::expect_with(|jail| {
        jail.create_file(DEFAULT_CONFIG_FILE, "[rings]\nspacing_multiplier = 3.0\n")?;
        let settings = load(None)?;
        assert_eq!(settings.rings.spacing_multiplier, 3.0);
        Ok(())
    });
}

#[test]
fn environment_wins_over_file() {
    Jail::expect_with(|jail| {
        jail.create_file(DEFAULT_CONFIG_FILE, "canvas_margin = 12.0\n")?;
        jail.set_env("RETRIEVAL_LENS_CANVAS_MARGIN", 40);
        jail.set_env("RETRIEVAL_LENS_COLLISION__DAMPING", 0.4);

        let settings = load(None)?;
        assert_eq!(settings.canvas_margin, 40.0);
        assert_eq!(settings.collision.damping, 0.4);
        Ok(())
    });
}

#[test]
fn malformed_values_are_reported() {
    Jail::expect_with(|jail| {
        jail.create_file("broken.toml", "[collision]\nmax_iterations = \"many\"\n")?;
        let error = LayoutSettings::load(Some(Path::new("broken.toml")))
            .expect_err("string is not an iteration count");
        assert!(error.to_string().contains("invalid layout settings"));
        Ok(())
    });
}
