use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Status {
    pub code_num: u16,
    pub message: &'static str,
}

// Sorted by code, lookups binary search on it.
// See: https://en.wikipedia.org/wiki/List_of_HTTP_status_codes
static STATUS_TABLE: &[(u16, &str)] = &[
    (100, "Continue"),
    (101, "Switching Protocols"),
    (102, "Processing"),
    (103, "Early Hints"),
    (200, "OK"),
    (201, "Created"),
    (202, "Accepted"),
    (203, "Non-Authoritative Information"),
    (204, "No Content"),
    (205, "Reset Content"),
    (206, "Partial Content"),
    (207, "Multi-Status"),
    (208, "Already Reported"),
    (218, "This is fine"),
    (226, "IM Used"),
    (300, "Multiple Choices"),
    (301, "Moved Permanently"),
    (302, "Found"),
    (303, "See Other"),
    (304, "Not Modified"),
    (305, "Use Proxy"),
    (306, "Switch Proxy"),
    (307, "Temporary Redirect"),
    (308, "Permanent Redirect"),
    (400, "Bad Request"),
    (401, "Unauthorized"),
    (402, "Payment Required"),
    (403, "Forbidden"),
    (404, "Not Found"),
    (405, "Method Not Allowed"),
    (406, "Not Acceptable"),
    (407, "Proxy Authentication Required"),
    (408, "Request Timeout"),
    (409, "Conflict"),
    (410, "Gone"),
    (411, "Length Required"),
    (412, "Precondition Failed"),
    (413, "Payload Too Large"),
    (414, "URI Too Long"),
    (415, "Unsupported Media Type"),
    (416, "Range Not Satisfiable"),
    (417, "Expectation Failed"),
    (418, "I'm a teapot"),
    (419, "Page Expired"),
    (420, "Enhance Your Calm"),
    (421, "Misdirected Request"),
    (422, "Unprocessable Entity"),
    (423, "Locked"),
    (424, "Failed Dependency"),
    (425, "Too Early"),
    (426, "Upgrade Required"),
    (428, "Precondition Required"),
    (429, "Too Many Requests"),
    (430, "Request Header Fields Too Large"),
    (431, "Request Header Fields Too Large"),
    (440, "Login Time-out"),
    (444, "No Response"),
    (449, "Retry With"),
    (450, "Blocked by Windows Parental Controls"),
    (451, "Unavailable For Legal Reasons"),
    (460, "Client Closed Connection"),
    (463, "Too Many Forwarded IP Addresses"),
    (494, "Request Header Too Large"),
    (495, "SSL Certificate Error"),
    (496, "SSL Certificate Required"),
    (497, "HTTP Request Sent to HTTPS Port"),
    (498, "Invalid Token"),
    (499, "Client Closed Request"),
    (500, "Internal Server Error"),
    (501, "Not Implemented"),
    (502, "Bad Gateway"),
    (503, "Service Unavailable"),
    (504, "Gateway Timeout"),
    (505, "HTTP Version Not Supported"),
    (506, "Variant Also Negotiates"),
    (507, "Insufficient Storage"),
    (508, "Loop Detected"),
    (509, "Bandwidth Limit Exceeded"),
    (510, "Not Extended"),
    (511, "Network Authentication Required"),
    (520, "Web Server Returned an Unknown Error"),
    (521, "Web Server Is Down"),
    (522, "Connection Timed Out"),
    (523, "Origin Is Unreachable"),
    (524, "A Timeout Occurred"),
    (525, "SSL Handshake Failed"),
    (526, "Invalid SSL Certificate"),
    (527, "Railgun Error"),
    (529, "Site is overloaded"),
    (530, "Site is frozen"),
    (561, "Unauthorized"),
    (598, "Network Read Timeout Error"),
    (599, "Network Connect Timeout Error"),
];

impl Status {
    pub const OK: Status = Status {
        code_num: 200,
        message: "OK",
    };
    pub const CREATED: Status = Status {
        code_num: 201,
        message: "Created",
    };
    pub const NO_CONTENT: Status = Status {
        code_num: 204,
        message: "No Content",
    };
    pub const MOVED_PERMANENTLY: Status = Status {
        code_num: 301,
        message: "Moved Permanently",
    };
    pub const FOUND: Status = Status {
        code_num: 302,
        message: "Found",
    };
    pub const BAD_REQUEST: Status = Status {
        code_num: 400,
        message: "Bad Request",
    };
    pub const NOT_FOUND: Status = Status {
        code_num: 404,
        message: "Not Found",
    };
    pub const INTERNAL_SERVER_ERROR: Status = Status {
        code_num: 500,
        message: "Internal Server Error",
    };

    /// Looks up a code in the table of known status codes.
    ///
    /// Returns `None` for anything the table does not list, which is the only
    /// notion of validity a status code has here.
    pub fn from_code(code: u16) -> Option<Status> {
        STATUS_TABLE
            .binary_search_by_key(&code, |&(c, _)| c)
            .ok()
            .map(|i| {
                let (code_num, message) = STATUS_TABLE[i];
                Status { code_num, message }
            })
    }

    pub fn is_known(code: u16) -> bool {
        Self::from_code(code).is_some()
    }

    /// Every known status, ordered by code.
    pub fn all() -> impl Iterator<Item = Status> {
        STATUS_TABLE
            .iter()
            .map(|&(code_num, message)| Status { code_num, message })
    }

    pub fn is_redirect(&self) -> bool {
        is_redirect_code(self.code_num)
    }
}

pub fn is_redirect_code(code: u16) -> bool {
    (300..400).contains(&code)
}

impl Default for Status {
    fn default() -> Self {
        Status::OK
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.code_num, self.message)
    }
}
