use std::io::{self, BufRead};
use std::thread;

use tokio::sync::mpsc::{self, Receiver, Sender};
use tracing::debug;

/// Raw feed of input lines, line endings stripped.
///
/// Blocking sources are read on a dedicated thread that hands lines over
/// through a channel of capacity one, so at most one line is read ahead of
/// what the consumer asked for. Dropping the source stops that thread after
/// its current read returns.
#[derive(Debug)]
pub struct LineSource {
    lines: Receiver<io::Result<String>>,
}

impl LineSource {
    pub fn stdin() -> LineSource {
        let (sender, receiver) = mpsc::channel(1);
        spawn_input_thread(move || pollster::block_on(input_loop(io::stdin().lock(), sender)));
        LineSource { lines: receiver }
    }

    pub fn from_reader<R: BufRead + Send + 'static>(reader: R) -> LineSource {
        let (sender, receiver) = mpsc::channel(1);
        spawn_input_thread(move || pollster::block_on(input_loop(reader, sender)));
        LineSource { lines: receiver }
    }

    pub fn from_channel(lines: Receiver<io::Result<String>>) -> LineSource {
        LineSource { lines }
    }

    /// Next raw line, empty ones included. Cancel safe.
    pub async fn next_line(&mut self) -> io::Result<String> {
        match self.lines.recv().await {
            Some(line) => line,
            None => Err(io::Error::new(io::ErrorKind::UnexpectedEof, "input closed")),
        }
    }
}

fn spawn_input_thread(input_loop: impl FnOnce() + Send + 'static) {
    let spawned = thread::Builder::new().name("line_source".into()).spawn(input_loop);
    // the receiver sees a closed channel and reports it as end of input
    if let Err(e) = spawned {
        debug!("could not start input thread: {e}");
    }
}

async fn input_loop(mut input: impl BufRead, sender: Sender<io::Result<String>>) {
    loop {
        let mut line = String::new();
        let result = match input.read_line(&mut line) {
            Ok(0) => Err(io::Error::new(io::ErrorKind::UnexpectedEof, "input stream ended")),
            Ok(_) => Ok(strip_line_ending(line)),
            Err(e) => Err(e),
        };
        let failed = result.is_err();
        if sender.send(result).await.is_err() {
            debug!("line source dropped, input thread stopping");
            return;
        }
        if failed {
            return;
        }
    }
}

fn strip_line_ending(mut line: String) -> String {
    while line.ends_with('\n') || line.ends_with('\r') {
        line.pop();
    }
    line
}
