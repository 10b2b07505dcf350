use std::{env, fs, path::PathBuf, process::Command};

fn run_bin(args: &[&str]) -> (bool, String, String) {
    let bin = PathBuf::from(env!("CARGO_BIN_EXE_sensorlog"));

    let output = Command::new(bin)
        .args(args)
        .output()
        .expect("failed to execute command");

    let stdout_str =
        String::from_utf8(output.stdout).expect("failed to convert stdout to string");
    let stderr_str =
        String::from_utf8(output.stderr).expect("failed to convert stderr to string");

    (output.status.success(), stdout_str, stderr_str)
}

fn test_dir(name: &str) -> PathBuf {
    let test_dir = PathBuf::from(env!("CARGO_TARGET_TMPDIR")).join(name);
    fs::remove_dir_all(&test_dir).ok();
    fs::create_dir(&test_dir).expect("failed to create test directory");
    test_dir
}

#[test]
fn acquire_and_plot_workflow() {
    let test_dir = test_dir("acquire_and_plot_workflow");

    let config_path = test_dir.join("config.toml");
    let config_contents = String::new()
        + "[sensor]\n"
        + "backend = \"simulated\"\n"
        + "seed = 42\n"
        + "noise = 0.3\n"
        + "\n"
        + "[render]\n"
        + "width = 600\n"
        + "height = 400\n";
    fs::write(&config_path, config_contents).expect("failed to write config file");

    let config_str = config_path
        .to_str()
        .expect("failed to convert config path to string");

    let mut log_contents = String::new();
    for _ in 0..3 {
        let (success, stdout_str, stderr_str) = run_bin(&["--config", config_str, "acquire"]);
        assert!(success, "failed to acquire\nstderr:\n{stderr_str}\n");

        let fields: Vec<&str> = stdout_str.trim_end().split('\t').collect();
        assert_eq!(fields.len(), 4, "unexpected line {stdout_str:?}");
        assert!(fields[0].parse::<i64>().is_ok());
        for field in &fields[1..] {
            let (_, decimals) = field.split_once('.').expect("missing decimal point");
            assert_eq!(decimals.len(), 1);
        }
        log_contents += &stdout_str;
    }

    let log_path = test_dir.join("sensors.log");
    fs::write(&log_path, log_contents).expect("failed to write log file");
    let output_path = test_dir.join("graph.png");

    let (success, _, stderr_str) = run_bin(&[
        "--config",
        config_str,
        "plot",
        "--log-file",
        log_path.to_str().expect("failed to convert log path to string"),
        "--output",
        output_path.to_str().expect("failed to convert output path to string"),
    ]);
    assert!(success, "failed to plot\nstderr:\n{stderr_str}\n");
    assert!(output_path.is_file());

    fs::remove_dir_all(&test_dir).ok();
}

#[test]
fn plot_empty_log_succeeds() {
    let test_dir = test_dir("plot_empty_log_succeeds");

    let log_path = test_dir.join("sensors.log");
    fs::write(&log_path, "").expect("failed to write log file");
    let output_path = test_dir.join("graph.png");

    let (success, _, stderr_str) = run_bin(&[
        "plot",
        "--log-file",
        log_path.to_str().expect("failed to convert log path to string"),
        "--output",
        output_path.to_str().expect("failed to convert output path to string"),
    ]);
    assert!(success, "failed to plot\nstderr:\n{stderr_str}\n");
    assert!(output_path.is_file());

    fs::remove_dir_all(&test_dir).ok();
}

#[test]
fn plot_malformed_log_fails() {
    let test_dir = test_dir("plot_malformed_log_fails");

    let log_path = test_dir.join("sensors.log");
    let log_contents = String::new()
        + "1600000000\t20.0\t50.0\t1000.0\n"
        + "1600000060\t20.1\t50.1\n"
        + "1600000120\t20.2\t50.0\t1000.0\n";
    fs::write(&log_path, log_contents).expect("failed to write log file");
    let output_path = test_dir.join("graph.png");

    let (success, _, stderr_str) = run_bin(&[
        "plot",
        "--log-file",
        log_path.to_str().expect("failed to convert log path to string"),
        "--output",
        output_path.to_str().expect("failed to convert output path to string"),
        "--multiplier",
        "2.5",
    ]);
    assert!(!success, "plot should fail on a malformed log");
    assert!(stderr_str.contains("FieldCount"), "stderr:\n{stderr_str}\n");
    assert!(!output_path.exists());

    fs::remove_dir_all(&test_dir).ok();
}

#[test]
fn acquire_reports_sensor_failure() {
    let test_dir = test_dir("acquire_reports_sensor_failure");

    let config_path = test_dir.join("config.toml");
    let config_contents = String::new()
        + "[sensor]\n"
        + "backend = \"iio\"\n"
        + &format!("humidity_device = {:?}\n", test_dir.join("missing0"))
        + &format!("pressure_device = {:?}\n", test_dir.join("missing1"))
        + "read_attempts = 2\n"
        + "retry_delay_ms = 0\n";
    fs::write(&config_path, config_contents).expect("failed to write config file");

    let (success, stdout_str, _) = run_bin(&[
        "--config",
        config_path.to_str().expect("failed to convert config path to string"),
        "acquire",
    ]);
    assert!(!success, "acquire should fail without sensors");
    assert!(stdout_str.is_empty());

    fs::remove_dir_all(&test_dir).ok();
}
