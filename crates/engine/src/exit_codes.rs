//! curl exit-code diagnosis table.
//!
//! Short descriptions for curl's documented exit codes, shown to users when
//! a run terminates with a non-zero status. The wording is part of the
//! user-facing contract and tracks the curl manual.

/// Returns the short description for a non-zero curl exit code.
///
/// Codes curl does not document map to `"Unknown error"`. Exit 0 is not an
/// error and never reaches this table.
pub fn describe_exit_code(code: u8) -> &'static str {
    match code {
        1 => "Unsupported protocol",
        2 => "Failed to initialize",
        3 => "URL malformed",
        4 => "Feature not included in this build",
        5 => "Couldn't resolve proxy",
        6 => "Couldn't resolve host",
        7 => "Failed to connect to host",
        8 => "Weird server reply",
        9 => "FTP access denied",
        10 => "FTP accept failed",
        11 => "FTP weird PASS reply",
        12 => "FTP accept timeout",
        13 => "FTP weird PASV reply",
        14 => "FTP weird 227 format",
        15 => "FTP can't get host",
        16 => "HTTP/2 framing layer error",
        17 => "FTP couldn't set binary",
        18 => "Partial file",
        19 => "FTP couldn't download/access the given file",
        21 => "Quote command returned error",
        22 => "HTTP page not retrieved",
        23 => "Write error",
        25 => "Upload failed",
        26 => "Read error",
        27 => "Out of memory",
        28 => "Operation timeout",
        30 => "FTP PORT failed",
        31 => "FTP couldn't use REST",
        33 => "HTTP range error",
        34 => "HTTP post error",
        35 => "SSL connect error",
        36 => "Bad download resume",
        37 => "Couldn't read file",
        38 => "LDAP cannot bind",
        39 => "LDAP search failed",
        41 => "Function not found",
        42 => "Aborted by callback",
        43 => "Internal error: bad function argument",
        45 => "Interface error",
        47 => "Too many redirects",
        48 => "Unknown option specified to libcurl",
        49 => "Malformed telnet option",
        52 => "The server didn't reply anything",
        53 => "SSL crypto engine not found",
        54 => "Cannot set SSL crypto engine as default",
        55 => "Failed sending network data",
        56 => "Failure in receiving network data",
        58 => "Problem with the local certificate",
        59 => "Couldn't use specified SSL cipher",
        60 => "Peer certificate cannot be authenticated with known CA certificates",
        61 => "Unrecognized transfer encoding",
        62 => "Invalid LDAP URL",
        63 => "Maximum file size exceeded",
        64 => "Requested FTP SSL level failed",
        65 => "Sending the data requires a rewind that failed",
        66 => "Failed to initialize SSL engine",
        67 => "The user name, password, or similar was not accepted",
        68 => "File not found on TFTP server",
        69 => "Permission problem on TFTP server",
        70 => "Out of disk space on TFTP server",
        71 => "Illegal TFTP operation",
        72 => "Unknown TFTP transfer ID",
        73 => "File already exists",
        74 => "No such user",
        77 => "Problem reading the SSL CA cert",
        78 => "The resource referenced in the URL does not exist",
        79 => "An unspecified error occurred during the SSH session",
        80 => "Failed to shut down the SSL connection",
        82 => "Could not load CRL file",
        83 => "Issuer check failed",
        84 => "The FTP PRET command failed",
        85 => "RTSP: mismatch of CSeq numbers",
        86 => "RTSP: mismatch of Session Identifiers",
        87 => "Unable to parse FTP file list",
        88 => "FTP chunk callback reported error",
        89 => "No connection available",
        90 => "SSL public key does not match pinned public key",
        91 => "Invalid SSL certificate status",
        92 => "Stream error in HTTP/2 framing layer",
        93 => "An API function was called from inside a callback",
        94 => "An authentication function returned an error",
        95 => "HTTP/3 layer error",
        96 => "QUIC connection error",
        _ => "Unknown error",
    }
}
