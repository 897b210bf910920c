//! linecmd CLI Client
//!
//! Command-line interface for talking to a linecmd server.

use std::io::{self, BufRead, BufReader, Read, Write};
use std::net::{Shutdown, TcpStream};
use std::process;
use std::thread;

use clap::Parser;

/// linecmd CLI
#[derive(Parser, Debug)]
#[command(name = "linecmd-cli")]
#[command(about = "CLI for the linecmd command server")]
struct Args {
    /// Server address
    #[arg(short, long, default_value = "127.0.0.1:10000")]
    server: String,

    /// Commands to send, e.g. `createdb` `insert:hello`.
    /// Without any, lines are relayed from stdin.
    commands: Vec<String>,
}

fn main() {
    let args = Args::parse();

    let stream = match TcpStream::connect(&args.server) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Unable to connect to {}: {}", args.server, e);
            process::exit(1);
        }
    };

    let result = if args.commands.is_empty() {
        interactive(stream)
    } else {
        batch(stream, &args.commands)
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Send every command followed by `exit`, then print everything the server
/// wrote before closing the connection
fn batch(mut stream: TcpStream, commands: &[String]) -> io::Result<()> {
    let mut request = String::new();
    for command in commands {
        request.push_str(command);
        request.push('\n');
    }
    request.push_str("exit\n");
    stream.write_all(request.as_bytes())?;

    let mut response = String::new();
    stream.read_to_string(&mut response)?;
    print!("{}", response);
    io::stdout().flush()
}

/// Relay stdin lines to the server and server output to stdout
fn interactive(stream: TcpStream) -> io::Result<()> {
    let mut reader = BufReader::new(stream.try_clone()?);
    let printer = thread::spawn(move || -> io::Result<()> {
        let stdout = io::stdout();
        let mut line = String::new();
        loop {
            line.clear();
            if reader.read_line(&mut line)? == 0 {
                return Ok(());
            }
            let mut out = stdout.lock();
            out.write_all(line.as_bytes())?;
            out.flush()?;
        }
    });

    let mut writer = stream.try_clone()?;
    for line in io::stdin().lock().lines() {
        let line = line?;
        // Server may have expired the session already
        if writer.write_all(format!("{}\n", line).as_bytes()).is_err() {
            break;
        }
        if line.trim().eq_ignore_ascii_case("exit") {
            break;
        }
    }
    let _ = stream.shutdown(Shutdown::Write);

    match printer.join() {
        Ok(result) => result,
        Err(_) => Err(io::Error::new(io::ErrorKind::Other, "output thread panicked")),
    }
}
