//! A demonstration suite. Most tests pass; one fails, two skip and three
//! crash so that every kind of result shows up in the report.
use isotest::{
    check_eq, check_false, check_ge, check_gt, check_le, check_lt, check_ne,
    check_not_null, check_null, check_str_eq, check_true, harness,
    registry::Registration, skip, skip_if,
};
use std::{
    env,
    fs::{self, OpenOptions},
    io::Write,
    path::PathBuf,
    ptr::{self, NonNull},
};

/// Directory for the scratch fixture's files, the temp dir when unset.
const SCRATCH_ENV: &str = "ISOTEST_DEMO_SCRATCH";

#[derive(Default)]
struct Text {
    text: &'static str,
    length: usize,
}

#[derive(Default)]
struct Buffer {
    data: Option<Vec<u8>>,
}

#[derive(Default)]
struct Scratch {
    path: Option<PathBuf>,
}

fn scratch_dir() -> PathBuf {
    env::var_os(SCRATCH_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(env::temp_dir)
}

fn segfault() {
    let address = NonNull::<u64>::dangling().as_ptr();
    // Reading the lowest page faults on every supported platform.
    let value = unsafe { ptr::read_volatile(address) };
    println!("read {}", value);
}

#[allow(unreachable_code)]
fn skipped_test_does_not_run(_: &mut ()) {
    skip!("This test is skipped for demonstration purposes.");
    check_true!(false);
}

fn all_assertions(data: &mut ()) {
    check_eq!(437, 437);
    check_ne!(42, 437);
    check_lt!(42, 437);
    check_le!(437, 437);
    check_gt!(437, 42);
    check_ge!(437, 437);
    check_str_eq!("Hello!", "Hello!");
    check_null!(ptr::null::<u8>());
    check_not_null!(data as *mut ());
    check_true!(true);
    // Fails on purpose.
    check_false!(true);
}

fn register(suite: &mut Registration) {
    let simple = suite.fixture::<()>("Simple_fixture");
    suite.test("Assert_true_succeeds", &simple, |_| check_true!(true));
    suite.test("Skipped_test_does_not_run", &simple, skipped_test_does_not_run);
    suite.test("Conditionally_skipped_test", &simple, |_| {
        skip_if!(false, "This skip directive will not run.");
        check_true!(true);
        skip_if!(true, "But this one will!");
        check_true!(false);
    });

    let text = suite.fixture::<Text>("String_fixture");
    suite.test("strlen_returns_correct_length", &text, |t| {
        t.text = "Hello!";
        t.length = 6;
        check_not_null!(t.text.as_ptr());
        check_str_eq!(t.text, "Hello!");
        check_eq!(t.text.len(), t.length);
    });
    suite
        .parameterized("strlen_correct_length_parameterised", &text, |t| {
            check_not_null!(t.text.as_ptr());
            check_eq!(t.text.len(), t.length);
        })
        .case(|t| {
            t.text = "";
            t.length = 0;
        })
        .case(|t| {
            t.text = "Hello!";
            t.length = 6;
        })
        .case(|t| {
            t.text = "Parameterised testing is awesome!";
            t.length = 33;
        })
        .case(|t| {
            t.text = "One more parameter set";
            t.length = 22;
        });

    // The test comes before the lifecycle overrides but still sees them.
    let buffer = suite.fixture::<Buffer>("Custom_lifecycle_fixture");
    suite.test("Copy_to_dynamic_string", &buffer, |b| {
        check_not_null!(b.data);
        let data = b.data.get_or_insert_with(Vec::new);
        check_ge!(data.capacity(), 1024);
        data.extend_from_slice(b"Custom test lifecycles rock!");
        check_str_eq!(
            String::from_utf8_lossy(data),
            "Custom test lifecycles rock!"
        );
        check_eq!(data.len(), 28);
    });
    suite.setup(&buffer, |b| b.data = Some(Vec::with_capacity(1024)));
    suite.teardown(&buffer, |b| b.data = None);

    suite.test("All_assertions", &simple, all_assertions);
    suite.test("Segfault_does_not_crash", &simple, |_| segfault());
    suite.test("Panic_is_contained", &simple, |_| {
        let empty: Vec<u8> = Vec::new();
        println!("first byte: {}", empty[0]);
    });

    // The scratch file is removed even though the body crashes.
    let scratch = suite.fixture::<Scratch>("Scratch_fixture");
    suite.setup(&scratch, |s| {
        let path = scratch_dir().join("isotest-demo-scratch.txt");
        check_true!(fs::write(&path, "in use\n").is_ok());
        s.path = Some(path);
    });
    suite.teardown(&scratch, |s| {
        if let Some(path) = s.path.take() {
            let log = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path.with_file_name("isotest-demo-teardown.log"));
            check_true!(log
                .and_then(|mut log| writeln!(log, "released {}", path.display()))
                .is_ok());
            check_true!(fs::remove_file(&path).is_ok());
        }
    });
    suite.test("Crash_still_tears_down", &scratch, |s| {
        check_not_null!(s.path);
        segfault();
    });
    suite.test("Runs_after_crash", &simple, |_| check_eq!(2 + 2, 4));
}

fn main() {
    harness::main(register)
}
