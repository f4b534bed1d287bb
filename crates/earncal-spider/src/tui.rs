use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::time::Duration;

/// Progress over the dates of a run: total, successful and failed dates.
///
/// Every bar is hidden unless `tui` is set. Lines printed through [`DateProgress::println`]
/// are shown above the bars in terminal mode and dropped otherwise, where `tracing` carries
/// the same information.
pub(crate) struct DateProgress {
    multi: Option<MultiProgress>,
    total: ProgressBar,
    success: ProgressBar,
    failure: ProgressBar,
}

impl DateProgress {
    pub(crate) fn new(len: usize, tui: bool) -> Self {
        if !tui {
            return Self {
                multi: None,
                total: ProgressBar::hidden(),
                success: ProgressBar::hidden(),
                failure: ProgressBar::hidden(),
            };
        }

        let multi = MultiProgress::new();

        // total number of dates to collect
        let total = multi.add(ProgressBar::new(len as u64).with_style(style(
            "{spinner:.magenta}\n \
                {msg:>9.white} |{bar:57.white/grey}| {pos:<2} / {human_len} \
                ({percent_precise}%) [Time: {elapsed}, Rate: {per_sec}, ETA: {eta}]",
        )));
        total.set_message("total");
        total.enable_steady_tick(Duration::from_millis(100));

        // dates collected
        let success = multi.insert_after(
            &total,
            ProgressBar::new(len as u64)
                .with_style(style(" {msg:>9.green} |{bar:57.green}| {pos:<2.green}")),
        );
        success.set_message("successes");

        // dates skipped
        let failure = multi.insert_after(
            &success,
            ProgressBar::new(len as u64)
                .with_style(style(" {msg:>9.red} |{bar:57.red}| {pos:<2.red}")),
        );
        failure.set_message("failures");

        Self {
            multi: Some(multi),
            total,
            success,
            failure,
        }
    }

    /// Print a line above the bars. Falls back to stderr when the terminal is not drawable.
    pub(crate) fn println(&self, msg: impl AsRef<str>) {
        match &self.multi {
            Some(multi) if !multi.is_hidden() => {
                if multi.println(msg.as_ref()).is_err() {
                    eprintln!("{}", msg.as_ref());
                }
            }
            Some(_) => eprintln!("{}", msg.as_ref()),
            None => {}
        }
    }

    pub(crate) fn succeeded(&self) {
        self.success.inc(1);
        self.total.inc(1);
    }

    pub(crate) fn failed(&self) {
        self.failure.inc(1);
        self.total.inc(1);
    }

    pub(crate) fn finish(&self) {
        self.total.finish();
        self.success.finish();
        self.failure.finish();
    }

    pub(crate) fn abandon(&self) {
        self.total.abandon();
        self.success.abandon();
        self.failure.abandon();
    }
}

fn style(template: &str) -> ProgressStyle {
    ProgressStyle::default_bar()
        .template(template)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("## ")
}

//////////////////////////////////////////////////////////////
// -- TESTS --
//////////////////////////////////////////////////////////////

#[test]
fn hidden_without_tui() {
    let progress = DateProgress::new(3, false);
    progress.println("not shown");
    progress.succeeded();
    progress.failed();
    progress.failed();

    assert!(progress.multi.is_none());
    assert_eq!(progress.total.position(), 3);
    assert_eq!(progress.success.position(), 1);
    assert_eq!(progress.failure.position(), 2);
}
