//! Process-level tests for the fatal underflow path and console entry points
//!
//! A failing check terminates the process, so these tests re-execute this
//! binary as a child with `NEBULA_TEST_CHILD` naming the scenario to run and
//! assert on its exit status and captured streams. The target is built with
//! `harness = false` so the child's stdout holds nothing but program output.

use nebula_runtime::{
    ExecutionContext, EOF_SENTINEL, check_call_stack, check_stack, flush, has_error, print_byte,
    print_int, read_byte, read_int, read_int_plus, stats, take_error,
};
use std::ffi::{CStr, CString};
use std::io::Write;
use std::process::{Command, Output, Stdio};
use std::ptr;

const CHILD_ENV: &str = "NEBULA_TEST_CHILD";
const DEPTH_ENV: &str = "NEBULA_TEST_DEPTH";
const MIN_ENV: &str = "NEBULA_TEST_MIN";

fn main() {
    match std::env::var(CHILD_ENV) {
        Ok(scenario) => run_child(&scenario),
        Err(_) => run_parent(),
    }
}

// =============================================================================
// Child side
// =============================================================================

fn env_u64(name: &str) -> u64 {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(0)
}

fn run_child(scenario: &str) {
    let block_a = CString::new("block_A").unwrap();

    match scenario {
        "data_underflow" => {
            let ctx = ExecutionContext::with_depths(2, 0);
            unsafe { check_stack(&ctx, 3, block_a.as_ptr(), ptr::null()) };
        }
        "data_underflow_pos" => {
            let ctx = ExecutionContext::new();
            let block = CString::new("loop_4").unwrap();
            let pos = CString::new("prog.ws:9:3").unwrap();
            unsafe { check_stack(&ctx, 1, block.as_ptr(), pos.as_ptr()) };
        }
        "data_sweep" => {
            let ctx = ExecutionContext::with_depths(env_u64(DEPTH_ENV), 0);
            unsafe { check_stack(&ctx, env_u64(MIN_ENV), block_a.as_ptr(), ptr::null()) };
        }
        "call_underflow" => {
            let ctx = ExecutionContext::with_depths(5, 0);
            let block = CString::new("ret_2").unwrap();
            unsafe { check_call_stack(&ctx, block.as_ptr(), ptr::null()) };
        }
        "call_ok" => {
            let ctx = ExecutionContext::with_depths(0, 1);
            unsafe { check_call_stack(&ctx, block_a.as_ptr(), ptr::null()) };
        }
        "output_before_underflow" => {
            print_int(7);
            print_byte(i64::from(b'\n'));
            print_int(8);
            let ctx = ExecutionContext::new();
            unsafe { check_stack(&ctx, 1, block_a.as_ptr(), ptr::null()) };
        }
        "emit_bytes" => {
            for b in 0..=255 {
                print_byte(b);
            }
            flush();
        }
        "echo_bytes" => {
            loop {
                let b = read_byte();
                if b == EOF_SENTINEL {
                    break;
                }
                print_int(b);
                print_byte(i64::from(b' '));
            }
            if read_byte() == EOF_SENTINEL && read_byte() == EOF_SENTINEL {
                print_int(EOF_SENTINEL);
            }
            flush();
        }
        "read_int" => {
            let value = read_int();
            print_int(value);
            print_byte(i64::from(if has_error() { b'!' } else { b'.' }));
            flush();
        }
        "read_int_malformed" => {
            let value = read_int();
            print_int(value);
            print_byte(i64::from(b' '));
            let msg = unsafe { CStr::from_ptr(take_error()) }
                .to_string_lossy()
                .into_owned();
            for b in msg.bytes() {
                print_byte(i64::from(b));
            }
            print_byte(i64::from(b' '));
            print_byte(read_byte());
            flush();
        }
        "read_int_plus" => {
            let mut value = -5i64;
            let first = unsafe { read_int_plus(&mut value) };
            print_int(first);
            print_byte(i64::from(b' '));
            print_int(value);
            print_byte(i64::from(b' '));
            let second = unsafe { read_int_plus(&mut value) };
            print_int(second);
            print_byte(i64::from(b' '));
            print_int(value);
            flush();
        }
        "exit_without_flush" => {
            // Generated main returns to the C runtime without flushing.
            print_int(42);
            print_byte(i64::from(b'!'));
            unsafe { libc::exit(0) };
        }
        "read_error_count" => {
            let before = stats::snapshot().read_errors;
            while !has_error() {
                read_int();
            }
            take_error();
            print_int((stats::snapshot().read_errors - before) as i64);
            flush();
        }
        other => panic!("unknown child scenario '{}'", other),
    }

    std::process::exit(0);
}

// =============================================================================
// Parent side
// =============================================================================

fn spawn_child(scenario: &str, envs: &[(&str, String)], stdin: &[u8]) -> Output {
    let exe = std::env::current_exe().expect("current test executable");
    let mut cmd = Command::new(exe);
    cmd.env(CHILD_ENV, scenario)
        .env_remove("NEBULA_LOG")
        .env_remove("NEBULA_REPORT")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    for (key, value) in envs {
        cmd.env(key, value);
    }

    let mut child = cmd.spawn().expect("spawn child");
    {
        let mut child_stdin = child.stdin.take().expect("child stdin");
        child_stdin.write_all(stdin).expect("write child stdin");
    }
    child.wait_with_output().expect("wait for child")
}

fn stdout_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn test_data_underflow_scenario() {
    let out = spawn_child("data_underflow", &[], b"");
    assert_eq!(out.status.code(), Some(1));
    assert_eq!(stderr_of(&out), "stack underflow at block_A\n");
    assert!(out.stdout.is_empty(), "unexpected stdout: {:?}", stdout_of(&out));
}

fn test_data_underflow_with_position() {
    let out = spawn_child("data_underflow_pos", &[], b"");
    assert_eq!(out.status.code(), Some(1));
    assert_eq!(stderr_of(&out), "stack underflow at loop_4 (prog.ws:9:3)\n");
}

fn test_data_sweep() {
    let cases: &[(u64, u64, bool)] = &[
        (0, 0, true),
        (0, 1, false),
        (1, 1, true),
        (1, 2, false),
        (4, 5, false),
        (5, 2, true),
        (0, 9, false),
        (9, 9, true),
    ];
    for &(depth, min, passes) in cases {
        let out = spawn_child(
            "data_sweep",
            &[(DEPTH_ENV, depth.to_string()), (MIN_ENV, min.to_string())],
            b"",
        );
        if passes {
            assert_eq!(out.status.code(), Some(0), "depth {} min {}", depth, min);
            assert!(out.stderr.is_empty(), "depth {} min {}", depth, min);
        } else {
            assert_eq!(out.status.code(), Some(1), "depth {} min {}", depth, min);
            assert!(stderr_of(&out).contains("block_A"));
            assert_eq!(stderr_of(&out).lines().count(), 1);
        }
    }
}

fn test_call_underflow_scenario() {
    let out = spawn_child("call_underflow", &[], b"");
    assert_eq!(out.status.code(), Some(1));
    assert_eq!(stderr_of(&out), "call stack underflow at ret_2\n");
    assert!(out.stdout.is_empty());

    let out = spawn_child("call_ok", &[], b"");
    assert_eq!(out.status.code(), Some(0));
    assert!(out.stderr.is_empty());
}

fn test_pending_output_flushed_before_exit() {
    let out = spawn_child("output_before_underflow", &[], b"");
    assert_eq!(out.status.code(), Some(1));
    assert_eq!(stdout_of(&out), "7\n8");
    assert_eq!(stderr_of(&out), "stack underflow at block_A\n");
}

fn test_byte_round_trip_across_processes() {
    let emitted = spawn_child("emit_bytes", &[], b"");
    assert_eq!(emitted.status.code(), Some(0));
    let expected: Vec<u8> = (0..=255u8).collect();
    assert_eq!(emitted.stdout, expected);

    let echoed = spawn_child("echo_bytes", &[], &emitted.stdout);
    assert_eq!(echoed.status.code(), Some(0));
    let text = stdout_of(&echoed);
    let values: Vec<i64> = text
        .split_whitespace()
        .map(|v| v.parse().expect("decimal value"))
        .collect();
    let (last, bytes) = values.split_last().expect("at least the EOF marker");
    assert_eq!(*last, EOF_SENTINEL);
    let bytes: Vec<u8> = bytes.iter().map(|&v| v as u8).collect();
    assert_eq!(bytes, expected);
}

fn test_read_int_scenario() {
    let out = spawn_child("read_int", &[], b"123\n");
    assert_eq!(out.status.code(), Some(0));
    assert_eq!(stdout_of(&out), "123.");

    let out = spawn_child("read_int", &[], b"  -42 7");
    assert_eq!(stdout_of(&out), "-42.");
}

fn test_read_int_malformed_scenario() {
    let out = spawn_child("read_int_malformed", &[], b"abc");
    assert_eq!(out.status.code(), Some(0));
    assert_eq!(
        stdout_of(&out),
        "0 read_int: expected integer, found byte 0x61 a"
    );

    let out = spawn_child("read_int", &[], b"");
    assert_eq!(stdout_of(&out), "0!");
}

fn test_read_int_plus_scenario() {
    let out = spawn_child("read_int_plus", &[], b"31 x");
    assert_eq!(out.status.code(), Some(0));
    assert_eq!(stdout_of(&out), "1 31 0 31");
}

fn test_output_reaches_stdout_on_normal_exit() {
    let out = spawn_child("exit_without_flush", &[], b"");
    assert_eq!(out.status.code(), Some(0));
    assert_eq!(stdout_of(&out), "42!");
    assert!(out.stderr.is_empty());
}

fn test_end_of_input_is_not_a_read_error() {
    let out = spawn_child("read_error_count", &[], b"1 2 3\n");
    assert_eq!(out.status.code(), Some(0));
    assert_eq!(stdout_of(&out), "0");

    let out = spawn_child("read_error_count", &[], b"1 x");
    assert_eq!(stdout_of(&out), "1");
}

fn run_parent() {
    let tests: &[(&str, fn())] = &[
        ("data_underflow_scenario", test_data_underflow_scenario),
        ("data_underflow_with_position", test_data_underflow_with_position),
        ("data_sweep", test_data_sweep),
        ("call_underflow_scenario", test_call_underflow_scenario),
        ("pending_output_flushed_before_exit", test_pending_output_flushed_before_exit),
        ("byte_round_trip_across_processes", test_byte_round_trip_across_processes),
        ("read_int_scenario", test_read_int_scenario),
        ("read_int_malformed_scenario", test_read_int_malformed_scenario),
        ("read_int_plus_scenario", test_read_int_plus_scenario),
        ("output_reaches_stdout_on_normal_exit", test_output_reaches_stdout_on_normal_exit),
        ("end_of_input_is_not_a_read_error", test_end_of_input_is_not_a_read_error),
    ];

    println!("running {} tests", tests.len());
    for (name, test) in tests {
        test();
        println!("test {} ... ok", name);
    }
}
